use std::sync::Arc;

use kanji_core::catalog::KanjiCatalog;
use kanji_core::model::DrillSettings;
use kanji_core::scheduler::Scheduler;
use storage::repository::Storage;
use storage::snapshot::SnapshotStore;

use crate::Clock;
use crate::capture_service::{CaptureService, OcrEngine, TextPassthroughEngine};
use crate::error::AppServicesError;
use crate::sessions::DrillLoopService;
use crate::study_service::StudyService;

/// Assembles app-facing services over one storage backend and catalog.
#[derive(Clone)]
pub struct AppServices {
    study: Arc<StudyService>,
    drill_loop: Arc<DrillLoopService>,
    capture: Arc<CaptureService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Arc<dyn KanjiCatalog>,
        settings: DrillSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        log::info!("opened study database at {db_url}");
        Ok(Self::from_storage(&storage, clock, catalog, settings))
    }

    /// Build services over a throwaway in-memory store.
    #[must_use]
    pub fn in_memory(
        clock: Clock,
        catalog: Arc<dyn KanjiCatalog>,
        settings: DrillSettings,
    ) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, catalog, settings)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        catalog: Arc<dyn KanjiCatalog>,
        settings: DrillSettings,
    ) -> Self {
        let scheduler = Scheduler::new();
        let snapshots = SnapshotStore::from_storage(storage);

        let study = Arc::new(StudyService::new(
            clock,
            scheduler.clone(),
            Arc::clone(&catalog),
            snapshots.clone(),
        ));
        let drill_loop = Arc::new(
            DrillLoopService::new(clock, scheduler, Arc::clone(&catalog), snapshots)
                .with_settings(settings),
        );
        let engine: Arc<dyn OcrEngine> = Arc::new(TextPassthroughEngine);
        let capture = Arc::new(CaptureService::new(engine, catalog));

        Self {
            study,
            drill_loop,
            capture,
        }
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    #[must_use]
    pub fn drill_loop(&self) -> Arc<DrillLoopService> {
        Arc::clone(&self.drill_loop)
    }

    #[must_use]
    pub fn capture(&self) -> Arc<CaptureService> {
        Arc::clone(&self.capture)
    }
}
