//! Focused-review pool fed by mistakes reported from school and from drills.

use serde::{Deserialize, Serialize};

use crate::catalog::KanjiCatalog;
use crate::model::{Grade, KanjiItem};

/// A character reported as missed outside the app, e.g. on a graded worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeEntry {
    #[serde(alias = "kanji")]
    pub character: String,
    #[serde(default)]
    pub target_grade: Option<Grade>,
}

/// One item of a focused review queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedCandidate {
    pub item: KanjiItem,
    pub target_grade: Option<Grade>,
    pub in_catalog: bool,
}

/// Deduplicated mistake pool with two independently managed channels.
///
/// Deserialized pools go through [`MistakePool::from_persisted`], so a
/// hand-edited or older payload cannot smuggle in duplicates or blanks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedPool")]
pub struct MistakePool {
    external: Vec<MistakeEntry>,
    drill: Vec<String>,
}

#[derive(Deserialize)]
struct PersistedPool {
    #[serde(default)]
    external: Vec<MistakeEntry>,
    #[serde(default)]
    drill: Vec<String>,
}

impl From<PersistedPool> for MistakePool {
    fn from(raw: PersistedPool) -> Self {
        Self::from_persisted(raw.external, raw.drill)
    }
}

impl MistakePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pool from stored channels.
    ///
    /// Characters are trimmed and blanks dropped. A repeated external entry
    /// keeps its first position and the last grade given for it; repeated
    /// drill entries collapse to the first.
    #[must_use]
    pub fn from_persisted(external: Vec<MistakeEntry>, drill: Vec<String>) -> Self {
        let mut pool = Self::new();
        for entry in external {
            pool.add_external_mistakes([entry.character], entry.target_grade, None);
        }
        for character in drill {
            pool.add_drill_mistake(&character);
        }
        pool
    }

    /// Upsert externally reported mistakes.
    ///
    /// Blank entries are dropped. The stored grade is the first of
    /// `target_grade`, the grade already on record, or `profile_grade`.
    /// Returns how many characters were accepted.
    pub fn add_external_mistakes<I, S>(
        &mut self,
        characters: I,
        target_grade: Option<Grade>,
        profile_grade: Option<Grade>,
    ) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = 0;
        for raw in characters {
            let character = raw.as_ref().trim();
            if character.is_empty() {
                continue;
            }
            accepted += 1;

            match self.external.iter_mut().find(|e| e.character == character) {
                Some(entry) => {
                    entry.target_grade = target_grade.or(entry.target_grade).or(profile_grade);
                }
                None => self.external.push(MistakeEntry {
                    character: character.to_owned(),
                    target_grade: target_grade.or(profile_grade),
                }),
            }
        }
        accepted
    }

    /// Remember a character missed during a drill. Returns `true` if it was new.
    pub fn add_drill_mistake(&mut self, character: &str) -> bool {
        let character = character.trim();
        if character.is_empty() || self.drill.iter().any(|c| c == character) {
            return false;
        }
        self.drill.push(character.to_owned());
        true
    }

    /// Empty the externally reported channel only.
    pub fn clear_external_mistakes(&mut self) {
        self.external.clear();
    }

    /// Empty the drill channel only.
    pub fn clear_drill_mistakes(&mut self) {
        self.drill.clear();
    }

    #[must_use]
    pub fn external(&self) -> &[MistakeEntry] {
        &self.external
    }

    #[must_use]
    pub fn drill(&self) -> &[String] {
        &self.drill
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.external.is_empty() && self.drill.is_empty()
    }

    /// Every pooled character once: external entries first, then drill-only ones.
    #[must_use]
    pub fn characters(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.external.iter().map(|e| e.character.as_str()).collect();
        for character in &self.drill {
            if !out.contains(&character.as_str()) {
                out.push(character);
            }
        }
        out
    }

    /// Resolve the pool into review items.
    ///
    /// Characters missing from the catalog become placeholders. A drill-only
    /// character is attributed the profile grade.
    pub fn build_focused_candidates<C>(
        &self,
        catalog: &C,
        profile_grade: Option<Grade>,
    ) -> Vec<FocusedCandidate>
    where
        C: KanjiCatalog + ?Sized,
    {
        self.characters()
            .into_iter()
            .map(|character| {
                let target_grade = self
                    .external
                    .iter()
                    .find(|e| e.character == character)
                    .and_then(|e| e.target_grade)
                    .or(profile_grade);

                match catalog.lookup(character) {
                    Some(item) => FocusedCandidate {
                        item: item.clone(),
                        target_grade,
                        in_catalog: true,
                    },
                    None => FocusedCandidate {
                        item: KanjiItem::placeholder(character, target_grade),
                        target_grade,
                        in_catalog: false,
                    },
                }
            })
            .collect()
    }
}
