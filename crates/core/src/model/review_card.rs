use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Leitner review state for a single kanji character.
///
/// Only the scheduler moves a card between boxes; `next_review_at` is always
/// derived from the box level through the scheduler's interval table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    #[serde(alias = "kanji")]
    character: String,
    #[serde(default)]
    box_level: u8,
    #[serde(default)]
    last_reviewed_at: Option<DateTime<Utc>>,
    next_review_at: DateTime<Utc>,
    #[serde(default)]
    correct_count: u32,
    #[serde(default)]
    incorrect_count: u32,
}

impl ReviewCard {
    /// A never-reviewed card in box 0, due at `now`.
    pub(crate) fn fresh(character: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            character: character.into(),
            box_level: 0,
            last_reviewed_at: None,
            next_review_at: now,
            correct_count: 0,
            incorrect_count: 0,
        }
    }

    pub(crate) fn apply_verdict(
        &mut self,
        is_correct: bool,
        box_level: u8,
        reviewed_at: DateTime<Utc>,
        next_review_at: DateTime<Utc>,
    ) {
        self.box_level = box_level;
        self.last_reviewed_at = Some(reviewed_at);
        self.next_review_at = next_review_at;
        if is_correct {
            self.correct_count = self.correct_count.saturating_add(1);
        } else {
            self.incorrect_count = self.incorrect_count.saturating_add(1);
        }
    }

    /// Pull a rehydrated box level back into range after the interval table shrank.
    pub(crate) fn clamp_box_level(&mut self, max_box_level: u8) {
        self.box_level = self.box_level.min(max_box_level);
    }

    #[must_use]
    pub fn character(&self) -> &str {
        &self.character
    }

    #[must_use]
    pub fn box_level(&self) -> u8 {
        self.box_level
    }

    #[must_use]
    pub fn last_reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.last_reviewed_at
    }

    #[must_use]
    pub fn next_review_at(&self) -> DateTime<Utc> {
        self.next_review_at
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    /// Total verdicts recorded for this character.
    #[must_use]
    pub fn review_count(&self) -> u32 {
        self.correct_count.saturating_add(self.incorrect_count)
    }

    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_at
    }
}
