use indexmap::IndexMap;
use thiserror::Error;

use crate::model::{Grade, KanjiItem};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog lists {character:?} more than once")]
    DuplicateCharacter { character: String },
    #[error("catalog entry {character:?} has no grade")]
    MissingGrade { character: String },
    #[error("catalog entry with an empty character")]
    EmptyCharacter,
    #[error("catalog JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only kanji reference data.
pub trait KanjiCatalog: Send + Sync {
    fn lookup(&self, character: &str) -> Option<&KanjiItem>;

    fn by_grade(&self, grade: Grade) -> Vec<&KanjiItem>;

    fn all(&self) -> Vec<&KanjiItem>;
}

/// In-memory catalog preserving the order entries were supplied in.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: IndexMap<String, KanjiItem>,
}

impl StaticCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError` for blank or duplicate characters and ungraded entries.
    pub fn from_items(items: impl IntoIterator<Item = KanjiItem>) -> Result<Self, CatalogError> {
        let mut map = IndexMap::new();
        for mut item in items {
            item.character = item.character.trim().to_owned();
            if item.character.is_empty() {
                return Err(CatalogError::EmptyCharacter);
            }
            if item.grade.is_none() {
                return Err(CatalogError::MissingGrade {
                    character: item.character,
                });
            }
            if map.contains_key(&item.character) {
                return Err(CatalogError::DuplicateCharacter {
                    character: item.character,
                });
            }
            map.insert(item.character.clone(), item);
        }
        Ok(Self { items: map })
    }

    /// Parse a JSON array of kanji entries.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed input, plus the `from_items` checks.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<KanjiItem> = serde_json::from_str(json)?;
        Self::from_items(items)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KanjiCatalog for StaticCatalog {
    fn lookup(&self, character: &str) -> Option<&KanjiItem> {
        self.items.get(character)
    }

    fn by_grade(&self, grade: Grade) -> Vec<&KanjiItem> {
        self.items
            .values()
            .filter(|item| item.grade == Some(grade))
            .collect()
    }

    fn all(&self) -> Vec<&KanjiItem> {
        self.items.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"character":"一","onReadings":["イチ"],"kunReadings":["ひと"],"meaning":"one","radical":"一","strokeCount":1,"grade":1},
        {"character":"右","onReadings":["ウ","ユウ"],"kunReadings":["みぎ"],"meaning":"right","radical":"口","strokeCount":5,"grade":1},
        {"character":"引","onReadings":["イン"],"kunReadings":["ひ"],"meaning":"pull","radical":"弓","strokeCount":4,"grade":2}
    ]"#;

    #[test]
    fn looks_up_and_filters_by_grade() {
        let catalog = StaticCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.lookup("右").unwrap().meaning, "right");
        assert!(catalog.lookup("左").is_none());

        let first: Vec<&str> = catalog
            .by_grade(Grade::new(1).unwrap())
            .into_iter()
            .map(|k| k.character.as_str())
            .collect();
        assert_eq!(first, vec!["一", "右"]);
        assert!(catalog.by_grade(Grade::new(6).unwrap()).is_empty());
    }

    #[test]
    fn rejects_duplicates_and_ungraded_entries() {
        let dup = StaticCatalog::from_items(vec![
            KanjiItem::placeholder("一", Grade::new(1).ok()),
            KanjiItem::placeholder("一", Grade::new(1).ok()),
        ]);
        assert!(matches!(dup, Err(CatalogError::DuplicateCharacter { .. })));

        let ungraded = StaticCatalog::from_items(vec![KanjiItem::placeholder("一", None)]);
        assert!(matches!(ungraded, Err(CatalogError::MissingGrade { .. })));

        assert!(matches!(
            StaticCatalog::from_json("{"),
            Err(CatalogError::Json(_))
        ));
    }
}
