//! Study cards: the full detail of one kanji plus a short memory story.

use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::model::KanjiItem;

/// Shown when a kanji has no reading of a kind.
const NO_READING: &str = "なし";

/// Everything the study view shows about one kanji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiDetail {
    pub character: String,
    pub on_readings: String,
    pub kun_readings: String,
    pub radical: String,
    pub stroke_count: u8,
    pub meaning: String,
}

impl KanjiDetail {
    #[must_use]
    pub fn from_item(item: &KanjiItem) -> Self {
        Self {
            character: item.character.clone(),
            on_readings: joined_readings(&item.on_readings),
            kun_readings: joined_readings(&item.kun_readings),
            radical: item.radical.clone(),
            stroke_count: item.stroke_count,
            meaning: item.meaning.clone(),
        }
    }
}

impl fmt::Display for KanjiDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.character)?;
        writeln!(f, "  音読み: {}", self.on_readings)?;
        writeln!(f, "  訓読み: {}", self.kun_readings)?;
        writeln!(f, "  部首: {}", self.radical)?;
        writeln!(f, "  画数: {}画", self.stroke_count)?;
        write!(f, "  意味: {}", self.meaning)
    }
}

fn joined_readings(readings: &[String]) -> String {
    if readings.is_empty() {
        NO_READING.to_owned()
    } else {
        readings.join("・")
    }
}

/// Every story variant for `item`, in a fixed order.
#[must_use]
pub fn story_variants(item: &KanjiItem) -> [String; 3] {
    let kanji = item.character.as_str();
    let meaning = item.meaning.as_str();
    let radical = item.radical.as_str();
    let main_on = item.on_readings.first().map_or("", String::as_str);
    let main_kun = item
        .kun_readings
        .first()
        .map_or(main_on, String::as_str);

    [
        format!(
            "「{kanji}」という字は、昔の人が「{meaning}」を絵に描いたことから生まれました。\
             部首の「{radical}」は、この漢字のもとになっている大切な部分です。\
             「{main_kun}」と読むこの字を使って、「{kanji}が大きい」「{kanji}を見る」のように使ってみよう！"
        ),
        format!(
            "「{kanji}」を見てください。部首は「{radical}」で、{meaning}に関係しています。\
             昔の中国では、この字は絵から作られました。\
             音読みは「{main_on}」、訓読みは「{main_kun}」です。毎日この字を使う場面を探してみよう！"
        ),
        format!(
            "{meaning}のことを「{kanji}」と書きます。音読みで「{main_on}」、訓読みで「{main_kun}」と読みます。\
             部首「{radical}」が、この漢字のカギになっています。この字が入っている言葉を5つ見つけてみよう！"
        ),
    ]
}

/// A memory story for `item`, one of [`story_variants`] picked with `rng`.
pub fn kanji_story<R>(item: &KanjiItem, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let variants = story_variants(item);
    variants.choose(rng).cloned().unwrap_or_default()
}
