use std::sync::Arc;

use rand::Rng;

use kanji_core::catalog::KanjiCatalog;
use kanji_core::model::DrillSettings;
use kanji_core::scheduler::Scheduler;
use kanji_core::snapshot::StudyState;
use storage::snapshot::SnapshotStore;

use super::choices::{QuestionMode, generate_choices};
use super::plan::{DrillSource, QueueBuilder};
use super::service::{DrillAnswer, DrillSession, DrillSummary};
use crate::Clock;
use crate::error::SessionError;

/// Result of answering a single question in a drill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillAnswerResult {
    pub answer: DrillAnswer,
    pub is_complete: bool,
    /// Present once the last question is answered.
    pub summary: Option<DrillSummary>,
}

/// Orchestrates drill start and persisted answering.
#[derive(Clone)]
pub struct DrillLoopService {
    clock: Clock,
    scheduler: Scheduler,
    catalog: Arc<dyn KanjiCatalog>,
    snapshots: SnapshotStore,
    settings: DrillSettings,
}

impl DrillLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        scheduler: Scheduler,
        catalog: Arc<dyn KanjiCatalog>,
        snapshots: SnapshotStore,
    ) -> Self {
        Self {
            clock,
            scheduler,
            catalog,
            snapshots,
            settings: DrillSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: DrillSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> DrillSettings {
        self.settings
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Start a drill from `source`, shuffled with `rng`.
    ///
    /// Resets the session score (the max streak is kept) and seeds review
    /// cards for the queued kanji.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the source has nothing to drill.
    pub fn start_session<R>(
        &self,
        state: &mut StudyState,
        source: DrillSource,
        mode: QuestionMode,
        rng: &mut R,
    ) -> Result<DrillSession, SessionError>
    where
        R: Rng + ?Sized,
    {
        let builder = QueueBuilder::new(self.catalog.as_ref(), self.settings);
        let candidates = builder.candidates(source, state);
        let plan = builder.build(candidates, rng);
        if plan.is_empty() {
            log::warn!("no kanji available for {source:?} drill");
            return Err(SessionError::Empty);
        }

        state.score.reset();
        DrillSession::start(
            &self.scheduler,
            &mut state.reviews,
            source,
            mode,
            plan,
            self.clock.now(),
        )
    }

    /// Options for the current question, drawn from the catalog pool for
    /// the question's grade, or from the drill itself when that is too small.
    /// Writing questions have no options.
    pub fn choices_for_current<R>(&self, session: &DrillSession, rng: &mut R) -> Vec<String>
    where
        R: Rng + ?Sized,
    {
        let Some(current) = session.current_item() else {
            return Vec::new();
        };
        let wanted = self.settings.choices_per_question();
        let mode = session.mode().effective_for(&current.item);
        if mode == QuestionMode::Writing {
            return Vec::new();
        }

        let grade_pool = match current.target_grade {
            Some(grade) => self.catalog.by_grade(grade),
            None => self.catalog.all(),
        };
        if grade_pool.len() >= wanted {
            generate_choices(&current.item, grade_pool, mode, wanted, rng)
        } else {
            generate_choices(
                &current.item,
                self.catalog.all().into_iter().chain(session.pool()),
                mode,
                wanted,
                rng,
            )
        }
    }

    /// Answer the current question and persist the updated state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for scheduling or persistence failures.
    pub async fn answer_current(
        &self,
        session: &mut DrillSession,
        state: &mut StudyState,
        is_correct: bool,
    ) -> Result<DrillAnswerResult, SessionError> {
        let answered_at = self.clock.now();
        let answer = session
            .answer_current(&self.scheduler, state, is_correct, answered_at)?
            .clone();
        self.persist(session, state, answer).await
    }

    /// Grade a picked option, then persist like [`Self::answer_current`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for scheduling or persistence failures.
    pub async fn answer_choice(
        &self,
        session: &mut DrillSession,
        state: &mut StudyState,
        choice: &str,
    ) -> Result<DrillAnswerResult, SessionError> {
        let answered_at = self.clock.now();
        let answer = session
            .answer_choice(&self.scheduler, state, choice, answered_at)?
            .clone();
        self.persist(session, state, answer).await
    }

    async fn persist(
        &self,
        session: &DrillSession,
        state: &StudyState,
        answer: DrillAnswer,
    ) -> Result<DrillAnswerResult, SessionError> {
        self.snapshots.save(&state.to_snapshot()).await?;

        let summary = session.is_complete().then(|| session.summary());
        if let Some(summary) = summary {
            log::info!(
                "drill finished: {}/{} correct ({:?})",
                summary.correct,
                summary.total,
                summary.rating
            );
        }

        Ok(DrillAnswerResult {
            answer,
            is_complete: session.is_complete(),
            summary,
        })
    }
}
