//! Picking kanji out of recognized worksheet text.
//!
//! Worksheets mark the characters to practise with a wavy or straight
//! underline. OCR tends to render those marks as `~`, `〰`, `-`, `_` or `=`
//! right next to the character, so a kanji adjacent to one of them is treated
//! as a study target.

use crate::catalog::KanjiCatalog;
use crate::model::KanjiItem;

const TARGET_MARKERS: [char; 7] = ['~', '〰', '～', '-', '_', '=', '＝'];

/// A kanji found in recognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedKanji {
    pub character: String,
    pub item: Option<KanjiItem>,
    pub is_study_target: bool,
}

/// CJK Unified Ideographs block, the range OCR output is scanned for.
#[must_use]
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Broader Han check used for typed input: extensions, compatibility
/// ideographs and the iteration mark 々.
#[must_use]
pub fn is_han(c: char) -> bool {
    matches!(c,
        '\u{2E80}'..='\u{2FDF}'
        | '\u{3005}'
        | '\u{3007}'
        | '\u{3021}'..='\u{3029}'
        | '\u{3038}'..='\u{303B}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2FA1F}'
        | '\u{30000}'..='\u{3134F}')
}

/// Unique kanji in `text`, in first-seen order, each flagged as a study target
/// when it touches an underline marker and resolved against the catalog.
pub fn extract_kanji_from_text<C>(text: &str, catalog: &C) -> Vec<ExtractedKanji>
where
    C: KanjiCatalog + ?Sized,
{
    let chars: Vec<char> = text.chars().collect();

    let mut targets: Vec<char> = Vec::new();
    for (i, c) in chars.iter().enumerate() {
        if !TARGET_MARKERS.contains(c) {
            continue;
        }
        let neighbours = [i.checked_sub(1), Some(i + 1)];
        for &j in neighbours.iter().flatten() {
            if let Some(&n) = chars.get(j) {
                if is_cjk_ideograph(n) && !targets.contains(&n) {
                    targets.push(n);
                }
            }
        }
    }

    let mut seen: Vec<char> = Vec::new();
    let mut out = Vec::new();
    for &c in &chars {
        if !is_cjk_ideograph(c) || seen.contains(&c) {
            continue;
        }
        seen.push(c);
        let character = c.to_string();
        out.push(ExtractedKanji {
            item: catalog.lookup(&character).cloned(),
            is_study_target: targets.contains(&c),
            character,
        });
    }
    out
}

/// Unique Han characters typed by the learner, in order.
#[must_use]
pub fn parse_kanji_input(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in text.chars().filter(|c| is_han(*c)) {
        let s = c.to_string();
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::model::Grade;

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_items(vec![
            KanjiItem::placeholder("遠", Grade::new(2).ok()),
            KanjiItem::placeholder("近", Grade::new(2).ok()),
        ])
        .unwrap()
    }

    #[test]
    fn marks_kanji_next_to_underlines() {
        let text = "えんきん法の~遠~と近くの山";
        let found = extract_kanji_from_text(text, &catalog());
        let summary: Vec<(&str, bool, bool)> = found
            .iter()
            .map(|k| (k.character.as_str(), k.is_study_target, k.item.is_some()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("法", false, false),
                ("遠", true, true),
                ("近", false, true),
                ("山", false, false),
            ]
        );
    }

    #[test]
    fn marker_at_text_edges_is_safe() {
        let found = extract_kanji_from_text("_水", &catalog());
        assert_eq!(found.len(), 1);
        assert!(found[0].is_study_target);

        let found = extract_kanji_from_text("火＝", &catalog());
        assert!(found[0].is_study_target);
        assert!(extract_kanji_from_text("~", &catalog()).is_empty());
    }

    #[test]
    fn duplicates_are_reported_once() {
        let found = extract_kanji_from_text("山山 山", &catalog());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn parse_input_keeps_unique_han_only() {
        assert_eq!(
            parse_kanji_input("遠、近 abc 遠々"),
            vec!["遠".to_owned(), "近".to_owned(), "々".to_owned()]
        );
        assert!(parse_kanji_input("ひらがな ABC").is_empty());
    }
}
