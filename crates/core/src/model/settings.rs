use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DrillSettingsError {
    #[error("a drill needs at least one question")]
    NoQuestions,
    #[error("multiple choice needs at least two options, got {provided}")]
    TooFewChoices { provided: usize },
}

/// Shape of a single drill session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrillSettings {
    questions_per_session: usize,
    choices_per_question: usize,
}

impl DrillSettings {
    pub const DEFAULT_QUESTIONS: usize = 15;
    pub const DEFAULT_CHOICES: usize = 4;

    /// # Errors
    ///
    /// Returns `DrillSettingsError` for an empty session or fewer than two choices.
    pub fn new(
        questions_per_session: usize,
        choices_per_question: usize,
    ) -> Result<Self, DrillSettingsError> {
        if questions_per_session == 0 {
            return Err(DrillSettingsError::NoQuestions);
        }
        if choices_per_question < 2 {
            return Err(DrillSettingsError::TooFewChoices {
                provided: choices_per_question,
            });
        }
        Ok(Self {
            questions_per_session,
            choices_per_question,
        })
    }

    #[must_use]
    pub fn questions_per_session(&self) -> usize {
        self.questions_per_session
    }

    #[must_use]
    pub fn choices_per_question(&self) -> usize {
        self.choices_per_question
    }
}

impl Default for DrillSettings {
    fn default() -> Self {
        Self {
            questions_per_session: Self::DEFAULT_QUESTIONS,
            choices_per_question: Self::DEFAULT_CHOICES,
        }
    }
}
