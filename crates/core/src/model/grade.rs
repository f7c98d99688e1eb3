use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GradeError {
    #[error("school grade must be between {min} and {max}, got {provided}", min = Grade::MIN, max = Grade::MAX)]
    OutOfRange { provided: u8 },
}

/// Elementary school grade (1年 through 6年) a kanji is taught in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// # Errors
    ///
    /// Returns `GradeError::OutOfRange` outside `1..=6`.
    pub fn new(value: u8) -> Result<Self, GradeError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GradeError::OutOfRange { provided: value })
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Every grade in ascending order.
    pub fn all() -> impl Iterator<Item = Grade> {
        (Self::MIN..=Self::MAX).map(Grade)
    }
}

impl TryFrom<u8> for Grade {
    type Error = GradeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Debug for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade({})", self.0)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}年", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            Grade::new(0),
            Err(GradeError::OutOfRange { provided: 0 })
        ));
        assert!(Grade::new(7).is_err());
        assert_eq!(Grade::new(6).unwrap().value(), 6);
    }

    #[test]
    fn serializes_as_bare_integer() {
        let grade = Grade::new(4).unwrap();
        assert_eq!(serde_json::to_string(&grade).unwrap(), "4");
        let parsed: Grade = serde_json::from_str("2").unwrap();
        assert_eq!(parsed.value(), 2);
        assert!(serde_json::from_str::<Grade>("9").is_err());
    }

    #[test]
    fn all_lists_six_grades() {
        let grades: Vec<u8> = Grade::all().map(Grade::value).collect();
        assert_eq!(grades, vec![1, 2, 3, 4, 5, 6]);
    }
}
