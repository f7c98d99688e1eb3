//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use kanji_core::scheduler::SchedulerError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::capture_service::OcrError;

/// Errors emitted by `StudyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyServiceError {
    #[error("{character:?} is not in the kanji catalog")]
    UnknownKanji { character: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by drill sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no kanji available for this drill")]
    Empty,
    #[error("drill already completed")]
    Completed,
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CaptureService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("text recognition timed out after {attempts} attempt(s) of {timeout:?}")]
    Timeout { attempts: u32, timeout: Duration },
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
