mod grade;
mod kanji;
mod profile;
mod review_card;
mod settings;

pub use grade::{Grade, GradeError};
pub use kanji::{KanjiItem, PLACEHOLDER_MEANING};
pub use profile::{Honorific, Profile};
pub use review_card::ReviewCard;
pub use settings::{DrillSettings, DrillSettingsError};
