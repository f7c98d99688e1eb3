use std::sync::Arc;

use kanji_core::capture::parse_kanji_input;
use kanji_core::catalog::KanjiCatalog;
use kanji_core::mistakes::FocusedCandidate;
use kanji_core::model::{Grade, KanjiItem, ReviewCard};
use kanji_core::scheduler::{Scheduler, rounded_percentage};
use kanji_core::snapshot::StudyState;
use kanji_core::study::{KanjiDetail, kanji_story};
use rand::Rng;
use storage::snapshot::SnapshotStore;

use crate::Clock;
use crate::error::StudyServiceError;

/// How many catalog kanji progress and study lists cover when no grade is chosen.
pub const ALL_GRADES_KANJI_LIMIT: usize = 40;

/// One kanji opened for study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyCard {
    pub detail: KanjiDetail,
    pub story: String,
}

/// Learner-facing progress numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub grade: Option<Grade>,
    /// Number of kanji covered by the report.
    pub total: usize,
    /// `level_counts[n]` is how many covered kanji sit in box `n`.
    pub level_counts: Vec<usize>,
    pub mastered: usize,
    pub mastery_percentage: u8,
    pub today_correct: u32,
    pub today_incorrect: u32,
    pub accuracy_percentage: u8,
    pub current_streak: u32,
    pub max_streak: u32,
}

/// Loads, queries and saves the learner's study state.
#[derive(Clone)]
pub struct StudyService {
    clock: Clock,
    scheduler: Scheduler,
    catalog: Arc<dyn KanjiCatalog>,
    snapshots: SnapshotStore,
}

impl StudyService {
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
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn KanjiCatalog {
        self.catalog.as_ref()
    }

    /// Load the stored state, or a fresh one on first launch.
    ///
    /// # Errors
    ///
    /// Returns `StudyServiceError::Storage` if the snapshot cannot be read.
    pub async fn load(&self) -> Result<StudyState, StudyServiceError> {
        let state = match self.snapshots.load().await? {
            Some(snapshot) => StudyState::from_snapshot(snapshot, &self.scheduler),
            None => StudyState::new(),
        };
        Ok(state)
    }

    /// # Errors
    ///
    /// Returns `StudyServiceError::Storage` if the snapshot cannot be written.
    pub async fn save(&self, state: &StudyState) -> Result<(), StudyServiceError> {
        self.snapshots.save(&state.to_snapshot()).await?;
        Ok(())
    }

    /// Forget all stored progress.
    ///
    /// # Errors
    ///
    /// Returns `StudyServiceError::Storage` if the backend fails.
    pub async fn reset(&self) -> Result<(), StudyServiceError> {
        self.snapshots.clear().await?;
        log::info!("cleared stored study state");
        Ok(())
    }

    /// Cards due now, in store order.
    #[must_use]
    pub fn due_cards<'a>(&self, state: &'a StudyState) -> Vec<&'a ReviewCard> {
        self.scheduler.due_cards(&state.reviews, self.clock.now())
    }

    /// Mastery over every card in the store.
    #[must_use]
    pub fn mastery_percentage(&self, state: &StudyState) -> u8 {
        self.scheduler.mastery_percentage(&state.reviews)
    }

    /// Progress over the profile's grade, or the first kanji of the whole
    /// catalog when every grade is selected. Kanji without a card count as
    /// box 0.
    #[must_use]
    pub fn progress(&self, state: &StudyState) -> ProgressReport {
        let grade = state.profile.selected_grade;
        let covered = self.study_list(state);

        let levels: Vec<u8> = covered
            .iter()
            .map(|item| state.reviews.box_level_of(&item.character))
            .collect();

        let mut level_counts = vec![0; usize::from(self.scheduler.max_box_level()) + 1];
        for level in &levels {
            if let Some(slot) = level_counts.get_mut(usize::from(*level)) {
                *slot += 1;
            }
        }
        let threshold = self.scheduler.mastery_threshold();
        let mastered = levels.iter().filter(|level| **level >= threshold).count();

        let score = state.score.score();
        let streak = state.score.streak();
        ProgressReport {
            grade,
            total: covered.len(),
            level_counts,
            mastered,
            mastery_percentage: rounded_percentage(mastered as u64, covered.len() as u64),
            today_correct: score.correct,
            today_incorrect: score.incorrect(),
            accuracy_percentage: score.accuracy_percentage(),
            current_streak: streak.current,
            max_streak: streak.max,
        }
    }

    /// Add kanji marked wrong on a school test to the focused pool.
    ///
    /// Returns how many characters were accepted; input without kanji is
    /// ignored.
    pub fn add_school_mistakes(
        &self,
        state: &mut StudyState,
        text: &str,
        target_grade: Option<Grade>,
    ) -> usize {
        let characters = parse_kanji_input(text);
        if characters.is_empty() {
            log::warn!("mistake input contained no kanji: {text:?}");
            return 0;
        }
        let added = state.mistakes.add_external_mistakes(
            characters,
            target_grade,
            state.profile.selected_grade,
        );
        log::debug!("recorded {added} school mistakes");
        added
    }

    #[must_use]
    pub fn focused_candidates(&self, state: &StudyState) -> Vec<FocusedCandidate> {
        state
            .mistakes
            .build_focused_candidates(self.catalog.as_ref(), state.profile.selected_grade)
    }

    /// `None` selects every grade.
    pub fn set_selected_grade(&self, state: &mut StudyState, grade: Option<Grade>) {
        state.profile.selected_grade = grade;
    }

    /// Kanji of the selected grade, or the first [`ALL_GRADES_KANJI_LIMIT`]
    /// catalog entries when every grade is selected.
    #[must_use]
    pub fn study_list(&self, state: &StudyState) -> Vec<&KanjiItem> {
        match state.profile.selected_grade {
            Some(grade) => self.catalog.by_grade(grade),
            None => {
                let mut all = self.catalog.all();
                all.truncate(ALL_GRADES_KANJI_LIMIT);
                all
            }
        }
    }

    /// Detail and a memory story for one catalog kanji.
    ///
    /// # Errors
    ///
    /// Returns `StudyServiceError::UnknownKanji` if the catalog does not
    /// know `character`.
    pub fn study_card<R>(&self, character: &str, rng: &mut R) -> Result<StudyCard, StudyServiceError>
    where
        R: Rng + ?Sized,
    {
        let character = character.trim();
        let item = self
            .catalog
            .lookup(character)
            .ok_or_else(|| StudyServiceError::UnknownKanji {
                character: character.to_owned(),
            })?;
        Ok(StudyCard {
            detail: KanjiDetail::from_item(item),
            story: kanji_story(item, rng),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanji_core::catalog::StaticCatalog;
    use kanji_core::model::KanjiItem;
    use kanji_core::time::{fixed_clock, fixed_now};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::Storage;

    fn catalog() -> Arc<dyn KanjiCatalog> {
        let grade_one = ["一", "二", "三", "四"]
            .into_iter()
            .map(|c| KanjiItem::placeholder(c, Grade::new(1).ok()));
        let grade_two = ["羽", "雲"]
            .into_iter()
            .map(|c| KanjiItem::placeholder(c, Grade::new(2).ok()));
        Arc::new(StaticCatalog::from_items(grade_one.chain(grade_two)).unwrap())
    }

    fn service(storage: &Storage) -> StudyService {
        StudyService::new(
            fixed_clock(),
            Scheduler::new(),
            catalog(),
            SnapshotStore::from_storage(storage),
        )
    }

    #[tokio::test]
    async fn load_defaults_then_round_trips() {
        let storage = Storage::in_memory();
        let svc = service(&storage);

        let mut state = svc.load().await.unwrap();
        assert!(state.reviews.is_empty());
        assert_eq!(state.profile.selected_grade, Grade::new(1).ok());

        state.reviews.seed(svc.scheduler(), ["一"], fixed_now());
        svc.add_school_mistakes(&mut state, "雲", None);
        svc.save(&state).await.unwrap();

        let reloaded = svc.load().await.unwrap();
        assert!(reloaded.reviews.contains("一"));
        assert_eq!(reloaded.mistakes.external().len(), 1);

        svc.reset().await.unwrap();
        assert!(svc.load().await.unwrap().reviews.is_empty());
    }

    #[test]
    fn progress_counts_missing_cards_as_box_zero() {
        let svc = service(&Storage::in_memory());
        let scheduler = Scheduler::new();
        let mut state = StudyState::new();
        state.reviews.seed(&scheduler, ["一", "二"], fixed_now());
        for _ in 0..4 {
            scheduler
                .record_result(&mut state.reviews, "一", true, fixed_now())
                .unwrap();
        }
        scheduler
            .record_result(&mut state.reviews, "二", true, fixed_now())
            .unwrap();
        state.score.record_answer(true);
        state.score.record_answer(false);

        let report = svc.progress(&state);
        assert_eq!(report.total, 4);
        assert_eq!(report.level_counts, vec![2, 1, 0, 0, 1, 0]);
        assert_eq!(report.mastered, 1);
        assert_eq!(report.mastery_percentage, 25);
        assert_eq!((report.today_correct, report.today_incorrect), (1, 1));
        assert_eq!(report.accuracy_percentage, 50);
        assert_eq!((report.current_streak, report.max_streak), (0, 1));

        svc.set_selected_grade(&mut state, None);
        assert_eq!(svc.progress(&state).total, 6);
    }

    #[test]
    fn due_cards_follow_the_clock() {
        let svc = service(&Storage::in_memory());
        let mut state = StudyState::new();
        state.reviews.seed(svc.scheduler(), ["一", "二"], fixed_now());
        svc.scheduler()
            .record_result(&mut state.reviews, "二", true, fixed_now())
            .unwrap();

        let due: Vec<_> = svc.due_cards(&state).into_iter().map(ReviewCard::character).collect();
        assert_eq!(due, vec!["一"]);
        assert_eq!(svc.mastery_percentage(&state), 0);
    }

    #[test]
    fn school_mistakes_use_profile_grade_and_skip_noise() {
        let svc = service(&Storage::in_memory());
        let mut state = StudyState::new();

        assert_eq!(svc.add_school_mistakes(&mut state, "abc 123", None), 0);
        assert_eq!(svc.add_school_mistakes(&mut state, "視、視 未", None), 2);

        let focused = svc.focused_candidates(&state);
        assert_eq!(focused.len(), 2);
        assert!(focused.iter().all(|c| !c.in_catalog));
        assert!(focused.iter().all(|c| c.target_grade == Grade::new(1).ok()));
    }

    #[test]
    fn study_list_follows_selected_grade() {
        let svc = service(&Storage::in_memory());
        let mut state = StudyState::new();
        let chars: Vec<&str> = svc
            .study_list(&state)
            .into_iter()
            .map(|item| item.character.as_str())
            .collect();
        assert_eq!(chars, vec!["一", "二", "三", "四"]);

        svc.set_selected_grade(&mut state, Grade::new(2).ok());
        assert_eq!(svc.study_list(&state).len(), 2);
        svc.set_selected_grade(&mut state, None);
        assert_eq!(svc.study_list(&state).len(), 6);
    }

    #[test]
    fn study_card_is_seeded_and_rejects_unknown_kanji() {
        let svc = service(&Storage::in_memory());

        let card = svc.study_card(" 雲 ", &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(card.detail.character, "雲");
        assert_eq!(card.detail.on_readings, "なし");
        let again = svc.study_card("雲", &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(card.story, again.story);
        assert!(card.story.contains("雲"));

        let err = svc
            .study_card("鬱", &mut StdRng::seed_from_u64(4))
            .unwrap_err();
        assert!(matches!(err, StudyServiceError::UnknownKanji { .. }));
    }
}
