use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use thiserror::Error;

use crate::model::ReviewCard;
use crate::scheduler::Scheduler;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReviewStateError {
    #[error("a review card for {character:?} already exists")]
    DuplicateCard { character: String },
}

/// Per-character review cards, kept in the order they were introduced.
///
/// The store is owned by whoever drives the session and lent to the scheduler
/// as `&mut` for each verdict, so a card is never observed half-updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewState {
    cards: IndexMap<String, ReviewCard>,
}

impl ReviewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted cards, clamping box levels the scheduler
    /// can no longer represent.
    #[must_use]
    pub fn from_cards(cards: IndexMap<String, ReviewCard>, scheduler: &Scheduler) -> Self {
        let cards = cards
            .into_iter()
            .filter(|(key, card)| key == card.character())
            .map(|(key, mut card)| {
                card.clamp_box_level(scheduler.max_box_level());
                (key, card)
            })
            .collect();
        Self { cards }
    }

    /// Add a freshly created card.
    ///
    /// # Errors
    ///
    /// Returns `ReviewStateError::DuplicateCard` if the character is already tracked.
    pub fn insert_new(&mut self, card: ReviewCard) -> Result<(), ReviewStateError> {
        if self.cards.contains_key(card.character()) {
            return Err(ReviewStateError::DuplicateCard {
                character: card.character().to_owned(),
            });
        }
        self.cards.insert(card.character().to_owned(), card);
        Ok(())
    }

    /// Create cards for every character not tracked yet; returns how many were created.
    pub fn seed<I, S>(&mut self, scheduler: &Scheduler, characters: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut created = 0;
        for character in characters {
            let character = character.as_ref().trim();
            if character.is_empty() || self.cards.contains_key(character) {
                continue;
            }
            self.cards
                .insert(character.to_owned(), scheduler.new_card(character, now));
            created += 1;
        }
        created
    }

    #[must_use]
    pub fn get(&self, character: &str) -> Option<&ReviewCard> {
        self.cards.get(character)
    }

    pub(crate) fn get_mut(&mut self, character: &str) -> Option<&mut ReviewCard> {
        self.cards.get_mut(character)
    }

    #[must_use]
    pub fn contains(&self, character: &str) -> bool {
        self.cards.contains_key(character)
    }

    /// Explicit data-management removal; the scheduler never deletes cards.
    pub fn remove(&mut self, character: &str) -> Option<ReviewCard> {
        self.cards.shift_remove(character)
    }

    /// Box level for a character, treating untracked characters as box 0.
    #[must_use]
    pub fn box_level_of(&self, character: &str) -> u8 {
        self.cards.get(character).map_or(0, ReviewCard::box_level)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ReviewCard> {
        self.cards.values()
    }

    #[must_use]
    pub fn cards(&self) -> &IndexMap<String, ReviewCard> {
        &self.cards
    }
}

impl<'a> IntoIterator for &'a ReviewState {
    type Item = &'a ReviewCard;
    type IntoIter = indexmap::map::Values<'a, String, ReviewCard>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn seed_skips_existing_and_blank_characters() {
        let s = Scheduler::new();
        let mut state = ReviewState::new();
        assert_eq!(state.seed(&s, ["一", "二", " ", "一"], fixed_now()), 2);
        assert_eq!(state.seed(&s, ["二", "三"], fixed_now()), 1);
        let order: Vec<&str> = state.iter().map(ReviewCard::character).collect();
        assert_eq!(order, vec!["一", "二", "三"]);
    }

    #[test]
    fn insert_new_rejects_duplicates() {
        let s = Scheduler::new();
        let mut state = ReviewState::new();
        state.insert_new(s.new_card("山", fixed_now())).unwrap();
        let err = state.insert_new(s.new_card("山", fixed_now())).unwrap_err();
        assert_eq!(
            err,
            ReviewStateError::DuplicateCard {
                character: "山".into()
            }
        );
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn due_cards_are_stable_across_calls() {
        let s = Scheduler::new();
        let now = fixed_now();
        let mut state = ReviewState::new();
        state.seed(&s, ["花", "草", "木", "森"], now);
        s.record_result(&mut state, "草", true, now).unwrap();

        let first: Vec<&str> = s.due_cards(&state, now).into_iter().map(ReviewCard::character).collect();
        let second: Vec<&str> = s.due_cards(&state, now).into_iter().map(ReviewCard::character).collect();
        assert_eq!(first, vec!["花", "木", "森"]);
        assert_eq!(first, second);
    }

    #[test]
    fn from_cards_clamps_levels_and_drops_mismatched_keys() {
        let wide = Scheduler::try_new(vec![0, 1, 2, 3, 4, 5, 6, 7], 4).unwrap();
        let now = fixed_now();
        let mut card = wide.new_card("空", now);
        for _ in 0..7 {
            wide.apply_verdict(&mut card, true, now);
        }
        assert_eq!(card.box_level(), 7);

        let mut cards = IndexMap::new();
        cards.insert("空".to_owned(), card.clone());
        cards.insert("別".to_owned(), card);

        let state = ReviewState::from_cards(cards, &Scheduler::new());
        assert_eq!(state.len(), 1);
        assert_eq!(state.box_level_of("空"), 5);
        assert_eq!(state.box_level_of("別"), 0);
        assert_eq!(
            state.get("空").unwrap().next_review_at(),
            now + Duration::days(7)
        );
    }

    #[test]
    fn remove_is_explicit() {
        let s = Scheduler::new();
        let mut state = ReviewState::new();
        state.seed(&s, ["雨"], fixed_now());
        assert!(state.remove("雨").is_some());
        assert!(!state.contains("雨"));
    }
}
