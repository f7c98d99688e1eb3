use rand::Rng;
use rand::seq::SliceRandom;

use kanji_core::model::KanjiItem;

/// What a question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionMode {
    /// Show the kanji, pick its reading.
    #[default]
    Reading,
    /// Show the kanji, pick its meaning.
    Meaning,
    /// Show reading and meaning, write the kanji.
    Writing,
}

impl QuestionMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "reading" => Some(Self::Reading),
            "meaning" => Some(Self::Meaning),
            "writing" => Some(Self::Writing),
            _ => None,
        }
    }

    /// Mode actually used to ask about `item`.
    ///
    /// A meaning question needs a real meaning, so items without one
    /// (placeholders for characters missing from the catalog) are asked as
    /// writing questions instead.
    #[must_use]
    pub fn effective_for(self, item: &KanjiItem) -> Self {
        match self {
            QuestionMode::Meaning if item.is_placeholder() || item.meaning.is_empty() => {
                QuestionMode::Writing
            }
            mode => mode,
        }
    }

    /// The answer a learner is expected to give for `item`.
    ///
    /// Readings use the first on reading, falling back to kun; an item
    /// without readings answers `"?"`.
    #[must_use]
    pub fn correct_answer(self, item: &KanjiItem) -> String {
        match self {
            QuestionMode::Reading => item.primary_reading().unwrap_or("?").to_owned(),
            QuestionMode::Meaning => item.meaning.clone(),
            QuestionMode::Writing => item.character.clone(),
        }
    }

    fn answer_for(self, item: &KanjiItem) -> Option<String> {
        match self {
            QuestionMode::Reading => item.primary_reading().map(str::to_owned),
            QuestionMode::Meaning if item.is_placeholder() || item.meaning.is_empty() => None,
            QuestionMode::Meaning => Some(item.meaning.clone()),
            QuestionMode::Writing => Some(item.character.clone()),
        }
    }
}

/// Multiple-choice options: the correct answer plus up to `count - 1`
/// distinct distractors drawn from other items in `pool`, shuffled.
pub fn generate_choices<'a, I, R>(
    item: &KanjiItem,
    pool: I,
    mode: QuestionMode,
    count: usize,
    rng: &mut R,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a KanjiItem>,
    R: Rng + ?Sized,
{
    let correct = mode.correct_answer(item);

    let mut distractors: Vec<String> = Vec::new();
    for other in pool {
        if other.character == item.character {
            continue;
        }
        let Some(answer) = mode.answer_for(other) else {
            continue;
        };
        if answer != correct && !distractors.contains(&answer) {
            distractors.push(answer);
        }
    }
    distractors.as_mut_slice().shuffle(rng);
    distractors.truncate(count.saturating_sub(1));

    let mut choices = Vec::with_capacity(distractors.len() + 1);
    choices.push(correct);
    choices.extend(distractors);
    choices.as_mut_slice().shuffle(rng);
    choices
}
