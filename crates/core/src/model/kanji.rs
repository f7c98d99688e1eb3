use serde::{Deserialize, Serialize};

use crate::model::Grade;

/// Meaning shown for a character that is not in the reference catalog.
pub const PLACEHOLDER_MEANING: &str = "（じしょにない漢字）";

/// Reference metadata for one kanji.
///
/// Catalog entries always carry a grade. Placeholders synthesized for unknown
/// characters inherit whatever grade the caller could attribute, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanjiItem {
    #[serde(alias = "kanji")]
    pub character: String,
    #[serde(default, alias = "on")]
    pub on_readings: Vec<String>,
    #[serde(default, alias = "kun")]
    pub kun_readings: Vec<String>,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub radical: String,
    #[serde(default, alias = "strokes")]
    pub stroke_count: u8,
    #[serde(default)]
    pub grade: Option<Grade>,
}

impl KanjiItem {
    /// Minimal stand-in for a character the catalog does not know.
    #[must_use]
    pub fn placeholder(character: impl Into<String>, grade: Option<Grade>) -> Self {
        Self {
            character: character.into(),
            on_readings: Vec::new(),
            kun_readings: Vec::new(),
            meaning: PLACEHOLDER_MEANING.to_owned(),
            radical: String::new(),
            stroke_count: 0,
            grade,
        }
    }

    /// On readings first, then kun readings.
    pub fn readings(&self) -> impl Iterator<Item = &str> {
        self.on_readings
            .iter()
            .chain(self.kun_readings.iter())
            .map(String::as_str)
    }

    #[must_use]
    pub fn primary_reading(&self) -> Option<&str> {
        self.readings().next()
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.meaning == PLACEHOLDER_MEANING && self.on_readings.is_empty() && self.kun_readings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_field_aliases() {
        let json = r#"{"kanji":"山","on":["サン"],"kun":["やま"],"meaning":"mountain","radical":"山","strokes":3,"grade":1}"#;
        let item: KanjiItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.character, "山");
        assert_eq!(item.primary_reading(), Some("サン"));
        assert_eq!(item.stroke_count, 3);
        assert_eq!(item.grade, Some(Grade::new(1).unwrap()));
    }

    #[test]
    fn placeholder_has_no_readings() {
        let item = KanjiItem::placeholder("鬱", None);
        assert!(item.is_placeholder());
        assert_eq!(item.primary_reading(), None);
        assert_eq!(item.meaning, PLACEHOLDER_MEANING);
    }
}
