use chrono::{DateTime, Utc};
use std::fmt;

use kanji_core::model::{KanjiItem, ReviewCard};
use kanji_core::scheduler::{Scheduler, rounded_percentage};
use kanji_core::snapshot::StudyState;
use kanji_core::state::ReviewState;

use super::choices::QuestionMode;
use super::plan::{DrillItem, DrillPlan, DrillSource};
use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── ANSWER RESULT ─────────────────────────────────────────────────────────────
//

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillAnswer {
    pub character: String,
    pub is_correct: bool,
    /// The review card as stored after the verdict.
    pub card: ReviewCard,
}

/// End-of-drill verdict shown to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRating {
    /// 80% or better.
    Excellent,
    /// 50% or better.
    Good,
    KeepTrying,
}

impl SessionRating {
    #[must_use]
    pub fn from_percentage(percent: u8) -> Self {
        match percent {
            80.. => SessionRating::Excellent,
            50.. => SessionRating::Good,
            _ => SessionRating::KeepTrying,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            SessionRating::Excellent => "すばらしい！",
            SessionRating::Good => "よくできました！",
            SessionRating::KeepTrying => "もうすこし がんばろう！",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrillSummary {
    pub correct: u32,
    pub total: u32,
    pub rating: SessionRating,
}

impl DrillSummary {
    #[must_use]
    pub fn percentage(&self) -> u8 {
        rounded_percentage(u64::from(self.correct), u64::from(self.total))
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One drill run over a shuffled queue of kanji.
///
/// Steps through the queue in order. Every verdict goes through the
/// scheduler into the caller's `StudyState`, so the session itself only
/// tracks position and per-question outcomes.
pub struct DrillSession {
    source: DrillSource,
    mode: QuestionMode,
    items: Vec<DrillItem>,
    current: usize,
    results: Vec<DrillAnswer>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl DrillSession {
    /// Start a drill over `plan`, seeding a review card for every queued
    /// character that does not have one yet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the plan has no items.
    pub fn start(
        scheduler: &Scheduler,
        reviews: &mut ReviewState,
        source: DrillSource,
        mode: QuestionMode,
        plan: DrillPlan,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if plan.is_empty() {
            return Err(SessionError::Empty);
        }

        let seeded = reviews.seed(
            scheduler,
            plan.items.iter().map(DrillItem::character),
            started_at,
        );
        log::debug!(
            "starting {:?} drill with {} of {} candidates, {seeded} new cards",
            source,
            plan.total(),
            plan.available
        );

        Ok(Self {
            source,
            mode,
            items: plan.items,
            current: 0,
            results: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn source(&self) -> DrillSource {
        self.source
    }

    #[must_use]
    pub fn mode(&self) -> QuestionMode {
        self.mode
    }

    #[must_use]
    pub fn items(&self) -> &[DrillItem] {
        &self.items
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn results(&self) -> &[DrillAnswer] {
        &self.results
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total(),
            answered: self.results.len(),
            remaining: self.remaining(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&DrillItem> {
        self.items.get(self.current)
    }

    /// Mode of the current question, after the per-item fallback.
    #[must_use]
    pub fn current_mode(&self) -> Option<QuestionMode> {
        self.current_item()
            .map(|item| self.mode.effective_for(&item.item))
    }

    /// Expected answer for the current question.
    #[must_use]
    pub fn correct_answer(&self) -> Option<String> {
        self.current_item()
            .map(|item| self.mode.effective_for(&item.item).correct_answer(&item.item))
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Record a verdict for the current question and advance.
    ///
    /// Updates the card through the scheduler, counts the answer on the
    /// score tracker and sends a missed character to the drill mistake pool.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once every question is answered.
    /// Propagates `SessionError::Scheduler` if the card store lost the card.
    pub fn answer_current(
        &mut self,
        scheduler: &Scheduler,
        state: &mut StudyState,
        is_correct: bool,
        answered_at: DateTime<Utc>,
    ) -> Result<&DrillAnswer, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let Some(item) = self.current_item() else {
            return Err(SessionError::Completed);
        };
        let character = item.character().to_owned();

        let card = scheduler.record_result(&mut state.reviews, &character, is_correct, answered_at)?;
        state.score.record_answer(is_correct);
        if !is_correct && state.mistakes.add_drill_mistake(&character) {
            log::debug!("added {character} to the drill mistake pool");
        }

        self.results.push(DrillAnswer {
            character,
            is_correct,
            card,
        });
        self.current += 1;
        if self.current >= self.items.len() {
            self.completed_at = Some(answered_at);
        }

        self.results.last().ok_or(SessionError::Completed)
    }

    /// Grade a picked multiple-choice option against the current question.
    ///
    /// # Errors
    ///
    /// Same as [`DrillSession::answer_current`].
    pub fn answer_choice(
        &mut self,
        scheduler: &Scheduler,
        state: &mut StudyState,
        choice: &str,
        answered_at: DateTime<Utc>,
    ) -> Result<&DrillAnswer, SessionError> {
        let Some(expected) = self.correct_answer() else {
            return Err(SessionError::Completed);
        };
        let is_correct = choice.trim() == expected;
        self.answer_current(scheduler, state, is_correct, answered_at)
    }

    #[must_use]
    pub fn summary(&self) -> DrillSummary {
        let total = u32::try_from(self.results.len()).unwrap_or(u32::MAX);
        let correct = u32::try_from(self.results.iter().filter(|r| r.is_correct).count())
            .unwrap_or(u32::MAX);
        let percent = rounded_percentage(u64::from(correct), u64::from(total));
        DrillSummary {
            correct,
            total,
            rating: SessionRating::from_percentage(percent),
        }
    }

    /// Items of this drill in question order, for building choice pools.
    pub fn pool(&self) -> impl Iterator<Item = &KanjiItem> {
        self.items.iter().map(|item| &item.item)
    }
}

impl fmt::Debug for DrillSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrillSession")
            .field("source", &self.source)
            .field("mode", &self.mode)
            .field("items_len", &self.items.len())
            .field("current", &self.current)
            .field("results_len", &self.results.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use kanji_core::model::Grade;
    use kanji_core::scheduler::SchedulerError;
    use kanji_core::time::fixed_now;

    fn item(character: &str, reading: &str) -> DrillItem {
        let mut item = KanjiItem::placeholder(character, Grade::new(1).ok());
        item.on_readings = vec![reading.to_owned()];
        DrillItem {
            target_grade: item.grade,
            item,
        }
    }

    fn plan(items: Vec<DrillItem>) -> DrillPlan {
        DrillPlan {
            available: items.len(),
            items,
        }
    }

    fn start(state: &mut StudyState, items: Vec<DrillItem>) -> DrillSession {
        DrillSession::start(
            &Scheduler::new(),
            &mut state.reviews,
            DrillSource::Grade(None),
            QuestionMode::Reading,
            plan(items),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_plan_is_rejected() {
        let mut state = StudyState::new();
        let err = DrillSession::start(
            &Scheduler::new(),
            &mut state.reviews,
            DrillSource::Focused,
            QuestionMode::Reading,
            DrillPlan::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn start_seeds_cards_for_queued_items() {
        let mut state = StudyState::new();
        let _session = start(&mut state, vec![item("山", "サン"), item("川", "セン")]);
        assert!(state.reviews.contains("山"));
        assert!(state.reviews.contains("川"));
        assert_eq!(state.reviews.box_level_of("山"), 0);
    }

    #[test]
    fn answers_flow_into_state_and_complete() {
        let scheduler = Scheduler::new();
        let mut state = StudyState::new();
        let mut session = start(&mut state, vec![item("山", "サン"), item("川", "セン")]);

        let first = session
            .answer_current(&scheduler, &mut state, true, fixed_now())
            .unwrap();
        assert_eq!(first.character, "山");
        assert_eq!(first.card.box_level(), 1);
        assert!(!session.is_complete());

        let second = session
            .answer_choice(&scheduler, &mut state, "サン", fixed_now())
            .unwrap();
        assert!(!second.is_correct);
        assert!(session.is_complete());
        assert_eq!(session.completed_at(), Some(fixed_now()));

        assert_eq!(state.reviews.box_level_of("山"), 1);
        assert_eq!(state.mistakes.drill(), ["川".to_owned()]);
        assert_eq!(state.score.score().correct, 1);
        assert_eq!(state.score.score().total, 2);

        let err = session
            .answer_current(&scheduler, &mut state, true, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Completed));
        assert_eq!(state.score.score().total, 2);
    }

    #[test]
    fn lost_card_surfaces_scheduler_error() {
        let scheduler = Scheduler::new();
        let mut state = StudyState::new();
        let mut session = start(&mut state, vec![item("山", "サン")]);
        state.reviews.remove("山");

        let err = session
            .answer_current(&scheduler, &mut state, true, fixed_now())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Scheduler(SchedulerError::UnknownCharacter { .. })
        ));
        assert_eq!(session.progress().answered, 0);
    }

    #[test]
    fn summary_rates_by_accuracy() {
        let scheduler = Scheduler::new();
        let mut state = StudyState::new();
        let mut session = start(
            &mut state,
            vec![item("一", "イチ"), item("二", "ニ"), item("三", "サン")],
        );
        for verdict in [true, true, false] {
            session
                .answer_current(&scheduler, &mut state, verdict, fixed_now())
                .unwrap();
        }

        let summary = session.summary();
        assert_eq!((summary.correct, summary.total), (2, 3));
        assert_eq!(summary.percentage(), 67);
        assert_eq!(summary.rating, SessionRating::Good);
        assert_eq!(session.progress().percent(), 100);
    }

    #[test]
    fn rating_thresholds() {
        assert_eq!(SessionRating::from_percentage(80), SessionRating::Excellent);
        assert_eq!(SessionRating::from_percentage(79), SessionRating::Good);
        assert_eq!(SessionRating::from_percentage(50), SessionRating::Good);
        assert_eq!(SessionRating::from_percentage(49), SessionRating::KeepTrying);
    }
}
