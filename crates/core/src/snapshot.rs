use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::mistakes::MistakePool;
use crate::model::{Profile, ReviewCard};
use crate::scheduler::Scheduler;
use crate::score::ScoreTracker;
use crate::state::ReviewState;

/// Persisted shape of everything the learner accumulates on this device.
///
/// Every field is optional on the way in so older or partial payloads still
/// load: missing cards or pool entries are empty, `maxStreak` is 0 and the
/// profile falls back to its defaults. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySnapshot {
    #[serde(default)]
    pub cards: IndexMap<String, ReviewCard>,
    #[serde(default)]
    pub mistake_pool: MistakePool,
    #[serde(default)]
    pub max_streak: u32,
    #[serde(default)]
    pub profile: Profile,
    /// Characters picked from the last photographed worksheet.
    #[serde(default)]
    pub extracted_kanji: Vec<String>,
}

/// Live study state: the owned counterpart of [`StudySnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyState {
    pub reviews: ReviewState,
    pub mistakes: MistakePool,
    pub score: ScoreTracker,
    pub profile: Profile,
    pub extracted_kanji: Vec<String>,
}

impl StudyState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a snapshot. The session score starts at zero.
    ///
    /// The mistake pool and extracted kanji are trimmed and deduplicated.
    #[must_use]
    pub fn from_snapshot(snapshot: StudySnapshot, scheduler: &Scheduler) -> Self {
        let StudySnapshot {
            cards,
            mistake_pool,
            max_streak,
            profile,
            extracted_kanji,
        } = snapshot;

        let mut extracted: Vec<String> = Vec::with_capacity(extracted_kanji.len());
        for character in extracted_kanji {
            let character = character.trim();
            if !character.is_empty() && !extracted.iter().any(|c| c == character) {
                extracted.push(character.to_owned());
            }
        }

        Self {
            reviews: ReviewState::from_cards(cards, scheduler),
            mistakes: MistakePool::from_persisted(
                mistake_pool.external().to_vec(),
                mistake_pool.drill().to_vec(),
            ),
            score: ScoreTracker::with_max_streak(max_streak),
            profile,
            extracted_kanji: extracted,
        }
    }

    #[must_use]
    pub fn to_snapshot(&self) -> StudySnapshot {
        StudySnapshot {
            cards: self.reviews.cards().clone(),
            mistake_pool: self.mistakes.clone(),
            max_streak: self.score.streak().max,
            profile: self.profile.clone(),
            extracted_kanji: self.extracted_kanji.clone(),
        }
    }
}
