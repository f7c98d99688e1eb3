use serde::{Deserialize, Serialize};

use crate::scheduler::rounded_percentage;

/// Answers given in the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionScore {
    pub correct: u32,
    pub total: u32,
}

impl SessionScore {
    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total.saturating_sub(self.correct)
    }

    /// Rounded share of correct answers; 0 before the first answer.
    #[must_use]
    pub fn accuracy_percentage(&self) -> u8 {
        rounded_percentage(u64::from(self.correct), u64::from(self.total))
    }
}

/// Consecutive correct answers. `max` is a lifetime high-water mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub max: u32,
}

/// Tallies verdicts for a session and the running streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    score: SessionScore,
    streak: Streak,
}

impl ScoreTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with a persisted best streak.
    #[must_use]
    pub fn with_max_streak(max_streak: u32) -> Self {
        Self {
            score: SessionScore::default(),
            streak: Streak {
                current: 0,
                max: max_streak,
            },
        }
    }

    pub fn record_answer(&mut self, is_correct: bool) {
        self.score.total = self.score.total.saturating_add(1);
        if is_correct {
            self.score.correct = self.score.correct.saturating_add(1);
            self.streak.current = self.streak.current.saturating_add(1);
        } else {
            self.streak.current = 0;
        }
        self.streak.max = self.streak.max.max(self.streak.current);
    }

    /// Start a new session. The best streak survives.
    pub fn reset(&mut self) {
        self.score = SessionScore::default();
        self.streak.current = 0;
    }

    #[must_use]
    pub fn score(&self) -> SessionScore {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> Streak {
        self.streak
    }
}
