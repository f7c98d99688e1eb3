use serde::{Deserialize, Serialize};

use crate::model::Grade;

/// Suffix used when greeting the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Honorific {
    #[default]
    #[serde(rename = "ちゃん")]
    Chan,
    #[serde(rename = "くん")]
    Kun,
}

impl Honorific {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Honorific::Chan => "ちゃん",
            Honorific::Kun => "くん",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ちゃん" | "chan" => Some(Self::Chan),
            "くん" | "kun" => Some(Self::Kun),
            _ => None,
        }
    }
}

/// Learner profile persisted alongside review progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// `None` means every grade is in play.
    #[serde(default = "default_selected_grade")]
    pub selected_grade: Option<Grade>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub honorific: Honorific,
}

fn default_selected_grade() -> Option<Grade> {
    Grade::new(Grade::MIN).ok()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            selected_grade: default_selected_grade(),
            user_name: String::new(),
            honorific: Honorific::default(),
        }
    }
}

impl Profile {
    /// Name with honorific, or `None` while the learner has not set a name.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let name = self.user_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(format!("{name}{}", self.honorific.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_grade() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.selected_grade, Grade::new(1).ok());
        assert_eq!(profile.honorific, Honorific::Chan);
    }

    #[test]
    fn explicit_null_grade_means_all_grades() {
        let profile: Profile = serde_json::from_str(r#"{"selectedGrade":null}"#).unwrap();
        assert_eq!(profile.selected_grade, None);
    }

    #[test]
    fn display_name_appends_honorific() {
        let profile = Profile {
            user_name: " はな ".into(),
            ..Profile::default()
        };
        assert_eq!(profile.display_name().as_deref(), Some("はなちゃん"));
        assert_eq!(Profile::default().display_name(), None);
        assert_eq!(Honorific::parse("kun"), Some(Honorific::Kun));
    }
}
