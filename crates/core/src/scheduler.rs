use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::ReviewCard;
use crate::state::ReviewState;

/// Days until the next review, indexed by box level.
pub const DEFAULT_INTERVAL_DAYS: [u32; 6] = [0, 1, 3, 7, 14, 30];

/// Box level at or above which a character counts as mastered.
pub const DEFAULT_MASTERY_THRESHOLD: u8 = 4;

/// Longest review interval a table may hold, about a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchedulerError {
    #[error("interval table must have at least one box")]
    EmptyIntervals,
    #[error("interval table has {len} boxes, at most 256 are supported")]
    TooManyBoxes { len: usize },
    #[error("interval for box {level} ({days}d) is shorter than the box below it")]
    DecreasingIntervals { level: u8, days: u32 },
    #[error("interval for box {level} ({days}d) exceeds the 36500-day limit")]
    IntervalTooLong { level: u8, days: u32 },
    #[error("mastery threshold {threshold} exceeds the highest box level {max_box_level}")]
    InvalidMasteryThreshold { threshold: u8, max_box_level: u8 },
    #[error("no review card exists for {character:?}")]
    UnknownCharacter { character: String },
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Leitner-box scheduler.
///
/// A correct answer promotes a card one box (saturating at the top box); a
/// wrong answer sends it all the way back to box 0, discarding every earlier
/// promotion. The next review time is always `now + intervals[box]` days.
///
/// # Examples
///
/// ```
/// # use kanji_core::scheduler::Scheduler;
/// # use kanji_core::state::ReviewState;
/// let scheduler = Scheduler::new();
/// let now = chrono::Utc::now();
/// let mut state = ReviewState::new();
/// state.seed(&scheduler, ["水"], now);
///
/// let card = scheduler.record_result(&mut state, "水", true, now)?;
/// assert_eq!(card.box_level(), 1);
/// assert_eq!(card.next_review_at(), now + chrono::Duration::days(1));
/// # Ok::<(), kanji_core::scheduler::SchedulerError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    intervals: Vec<u32>,
    mastery_threshold: u8,
}

impl Scheduler {
    /// Scheduler with the standard `[0, 1, 3, 7, 14, 30]` day table and mastery at box 4.
    #[must_use]
    pub fn new() -> Self {
        Self {
            intervals: DEFAULT_INTERVAL_DAYS.to_vec(),
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
        }
    }

    /// Scheduler with a custom interval table.
    ///
    /// # Errors
    ///
    /// - `EmptyIntervals` / `TooManyBoxes` if the table length is unusable
    /// - `DecreasingIntervals` if a higher box would come back sooner than a lower one
    /// - `IntervalTooLong` if a box waits longer than [`MAX_INTERVAL_DAYS`]
    /// - `InvalidMasteryThreshold` if the threshold is above the top box
    pub fn try_new(intervals: Vec<u32>, mastery_threshold: u8) -> Result<Self, SchedulerError> {
        if intervals.is_empty() {
            return Err(SchedulerError::EmptyIntervals);
        }
        let max_box_level = u8::try_from(intervals.len() - 1)
            .map_err(|_| SchedulerError::TooManyBoxes { len: intervals.len() })?;

        if let Some((idx, &days)) = intervals
            .iter()
            .enumerate()
            .find(|&(_, &days)| days > MAX_INTERVAL_DAYS)
        {
            return Err(SchedulerError::IntervalTooLong {
                level: u8::try_from(idx).unwrap_or(u8::MAX),
                days,
            });
        }

        for (idx, pair) in intervals.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(SchedulerError::DecreasingIntervals {
                    level: u8::try_from(idx + 1).unwrap_or(u8::MAX),
                    days: pair[1],
                });
            }
        }

        if mastery_threshold > max_box_level {
            return Err(SchedulerError::InvalidMasteryThreshold {
                threshold: mastery_threshold,
                max_box_level,
            });
        }

        Ok(Self {
            intervals,
            mastery_threshold,
        })
    }

    #[must_use]
    pub fn intervals(&self) -> &[u32] {
        &self.intervals
    }

    /// Highest box a card can reach.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn max_box_level(&self) -> u8 {
        // `try_new` guarantees the table has at most 256 entries.
        (self.intervals.len() - 1) as u8
    }

    #[must_use]
    pub fn mastery_threshold(&self) -> u8 {
        self.mastery_threshold
    }

    /// Review interval for a box; levels past the top use the top box.
    #[must_use]
    pub fn interval_for(&self, box_level: u8) -> Duration {
        let idx = usize::from(box_level.min(self.max_box_level()));
        Duration::days(i64::from(self.intervals[idx]))
    }

    #[must_use]
    pub fn next_review_at(&self, box_level: u8, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.interval_for(box_level))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Box a card moves to after a verdict.
    #[must_use]
    pub fn next_box_level(&self, current: u8, is_correct: bool) -> u8 {
        if is_correct {
            current.saturating_add(1).min(self.max_box_level())
        } else {
            0
        }
    }

    /// Create a card for a character that has never been reviewed.
    #[must_use]
    pub fn new_card(&self, character: impl Into<String>, now: DateTime<Utc>) -> ReviewCard {
        ReviewCard::fresh(character, now)
    }

    /// Apply a verdict to a card in place.
    pub fn apply_verdict(&self, card: &mut ReviewCard, is_correct: bool, now: DateTime<Utc>) {
        let level = self.next_box_level(card.box_level(), is_correct);
        card.apply_verdict(is_correct, level, now, self.next_review_at(level, now));
    }

    /// Record a verdict for `character` and return the updated card.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::UnknownCharacter` if the character was never
    /// seeded into `state`; the state is left untouched.
    pub fn record_result(
        &self,
        state: &mut ReviewState,
        character: &str,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<ReviewCard, SchedulerError> {
        let card = state
            .get_mut(character)
            .ok_or_else(|| SchedulerError::UnknownCharacter {
                character: character.to_owned(),
            })?;
        self.apply_verdict(card, is_correct, now);
        Ok(card.clone())
    }

    /// Cards whose next review time has passed, in the order given.
    pub fn due_cards<'a, I>(&self, cards: I, now: DateTime<Utc>) -> Vec<&'a ReviewCard>
    where
        I: IntoIterator<Item = &'a ReviewCard>,
    {
        cards.into_iter().filter(|card| card.is_due(now)).collect()
    }

    #[must_use]
    pub fn is_mastered(&self, card: &ReviewCard) -> bool {
        card.box_level() >= self.mastery_threshold
    }

    /// Share of cards at or above the mastery threshold, rounded to a whole percent.
    ///
    /// An empty set yields 0.
    pub fn mastery_percentage<'a, I>(&self, cards: I) -> u8
    where
        I: IntoIterator<Item = &'a ReviewCard>,
    {
        self.mastery_percentage_for_levels(cards.into_iter().map(ReviewCard::box_level))
    }

    /// Same as [`Scheduler::mastery_percentage`] over raw box levels.
    pub fn mastery_percentage_for_levels<I>(&self, levels: I) -> u8
    where
        I: IntoIterator<Item = u8>,
    {
        let (mastered, total) = levels.into_iter().fold((0_u64, 0_u64), |(m, t), level| {
            (m + u64::from(level >= self.mastery_threshold), t + 1)
        });
        rounded_percentage(mastered, total)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn rounded_percentage(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole);
    ((200 * part + whole) / (2 * whole)) as u8
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
