#![forbid(unsafe_code)]

pub mod app_services;
pub mod capture_service;
pub mod error;
pub mod sessions;
pub mod study_service;

pub use kanji_core::Clock;

pub use app_services::AppServices;
pub use capture_service::{CaptureResult, CaptureService, OcrEngine, OcrError, TextPassthroughEngine};
pub use error::{AppServicesError, CaptureError, SessionError, StudyServiceError};
pub use study_service::{ProgressReport, StudyCard, StudyService};

pub use sessions::{
    DrillAnswer, DrillAnswerResult, DrillLoopService, DrillSession, DrillSource, DrillSummary,
    QuestionMode, SessionProgress, SessionRating,
};
