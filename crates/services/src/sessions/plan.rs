use rand::Rng;
use rand::seq::SliceRandom;

use kanji_core::catalog::KanjiCatalog;
use kanji_core::model::{DrillSettings, Grade, KanjiItem};
use kanji_core::snapshot::StudyState;

/// Where a drill draws its kanji from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillSource {
    /// Catalog kanji for one grade, or every grade when `None`.
    Grade(Option<Grade>),
    /// The mistake pool, merged from school reports and earlier drills.
    Focused,
    /// Characters picked from the last photographed worksheet.
    Extracted,
}

/// One queued question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillItem {
    pub item: KanjiItem,
    pub target_grade: Option<Grade>,
}

impl DrillItem {
    #[must_use]
    pub fn character(&self) -> &str {
        &self.item.character
    }
}

/// Ordered questions for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrillPlan {
    pub items: Vec<DrillItem>,
    pub available: usize,
}

impl DrillPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds a drill queue from a candidate source.
pub struct QueueBuilder<'a, C: ?Sized> {
    catalog: &'a C,
    settings: DrillSettings,
}

impl<'a, C> QueueBuilder<'a, C>
where
    C: KanjiCatalog + ?Sized,
{
    #[must_use]
    pub fn new(catalog: &'a C, settings: DrillSettings) -> Self {
        Self { catalog, settings }
    }

    /// Every item the source could contribute, in source order.
    #[must_use]
    pub fn candidates(&self, source: DrillSource, state: &StudyState) -> Vec<DrillItem> {
        match source {
            DrillSource::Grade(grade) => {
                let items = match grade {
                    Some(grade) => self.catalog.by_grade(grade),
                    None => self.catalog.all(),
                };
                items
                    .into_iter()
                    .map(|item| DrillItem {
                        target_grade: item.grade,
                        item: item.clone(),
                    })
                    .collect()
            }
            DrillSource::Focused => state
                .mistakes
                .build_focused_candidates(self.catalog, state.profile.selected_grade)
                .into_iter()
                .map(|c| DrillItem {
                    item: c.item,
                    target_grade: c.target_grade,
                })
                .collect(),
            DrillSource::Extracted => state
                .extracted_kanji
                .iter()
                .filter_map(|character| self.catalog.lookup(character))
                .map(|item| DrillItem {
                    target_grade: item.grade,
                    item: item.clone(),
                })
                .collect(),
        }
    }

    /// Shuffle the candidates and keep at most `questions_per_session`.
    pub fn build<R>(&self, mut candidates: Vec<DrillItem>, rng: &mut R) -> DrillPlan
    where
        R: Rng + ?Sized,
    {
        let available = candidates.len();
        candidates.as_mut_slice().shuffle(rng);
        candidates.truncate(self.settings.questions_per_session());
        DrillPlan {
            items: candidates,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanji_core::catalog::StaticCatalog;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> StaticCatalog {
        let items = ["一", "二", "三", "四", "五", "六", "七"]
            .into_iter()
            .map(|c| KanjiItem::placeholder(c, Grade::new(1).ok()))
            .chain(["羽", "雲"].into_iter().map(|c| KanjiItem::placeholder(c, Grade::new(2).ok())))
            .collect::<Vec<_>>();
        StaticCatalog::from_items(items).unwrap()
    }

    fn chars(plan: &DrillPlan) -> Vec<&str> {
        plan.items.iter().map(DrillItem::character).collect()
    }

    #[test]
    fn grade_source_filters_catalog() {
        let catalog = catalog();
        let builder = QueueBuilder::new(&catalog, DrillSettings::default());
        let state = StudyState::new();

        assert_eq!(builder.candidates(DrillSource::Grade(Grade::new(2).ok()), &state).len(), 2);
        assert_eq!(builder.candidates(DrillSource::Grade(None), &state).len(), 9);
    }

    #[test]
    fn build_truncates_to_session_size() {
        let catalog = catalog();
        let settings = DrillSettings::new(3, 4).unwrap();
        let builder = QueueBuilder::new(&catalog, settings);
        let candidates = builder.candidates(DrillSource::Grade(None), &StudyState::new());

        let plan = builder.build(candidates, &mut StdRng::seed_from_u64(1));
        assert_eq!(plan.total(), 3);
        assert_eq!(plan.available, 9);
    }

    #[test]
    fn same_seed_same_order() {
        let catalog = catalog();
        let builder = QueueBuilder::new(&catalog, DrillSettings::default());
        let state = StudyState::new();

        let a = builder.build(
            builder.candidates(DrillSource::Grade(None), &state),
            &mut StdRng::seed_from_u64(42),
        );
        let b = builder.build(
            builder.candidates(DrillSource::Grade(None), &state),
            &mut StdRng::seed_from_u64(42),
        );
        assert_eq!(chars(&a), chars(&b));

        let mut sorted = chars(&a);
        sorted.sort_unstable();
        let mut expected = vec!["一", "二", "三", "四", "五", "六", "七", "羽", "雲"];
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn focused_and_extracted_sources() {
        let catalog = catalog();
        let builder = QueueBuilder::new(&catalog, DrillSettings::default());
        let mut state = StudyState::new();
        state.mistakes.add_external_mistakes(["視"], Grade::new(4).ok(), None);
        state.mistakes.add_drill_mistake("一");
        state.extracted_kanji = vec!["雲".into(), "未知".into()];

        let focused = builder.candidates(DrillSource::Focused, &state);
        assert_eq!(focused.len(), 2);
        assert!(focused[0].item.is_placeholder());
        assert_eq!(focused[0].target_grade, Grade::new(4).ok());
        assert_eq!(focused[1].target_grade, Grade::new(1).ok());

        let extracted = builder.candidates(DrillSource::Extracted, &state);
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].character(), "雲");
    }
}
