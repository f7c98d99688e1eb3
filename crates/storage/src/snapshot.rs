use std::sync::Arc;

use kanji_core::snapshot::StudySnapshot;

use crate::repository::{KeyValueStore, Storage, StorageError};

/// Key the study snapshot lives under.
pub const SNAPSHOT_KEY: &str = "kanzi-drill-storage";

/// Loads and saves the study snapshot as JSON in a key-value store.
#[derive(Clone)]
pub struct SnapshotStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, SNAPSHOT_KEY)
    }

    #[must_use]
    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self::new(Arc::clone(&storage.kv))
    }

    /// Read the stored snapshot, or `None` on first launch.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored JSON is unreadable,
    /// or the backend's error if it cannot be reached.
    pub async fn load(&self) -> Result<Option<StudySnapshot>, StorageError> {
        let Some(raw) = self.kv.get(&self.key).await? else {
            log::info!("no stored snapshot under {:?}", self.key);
            return Ok(None);
        };
        let snapshot: StudySnapshot = serde_json::from_str(&raw)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        log::info!(
            "loaded snapshot with {} cards and {} pooled mistakes",
            snapshot.cards.len(),
            snapshot.mistake_pool.characters().len()
        );
        Ok(Some(snapshot))
    }

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or writing fails.
    pub async fn save(&self, snapshot: &StudySnapshot) -> Result<(), StorageError> {
        let raw = serde_json::to_string(snapshot)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.put(&self.key, &raw).await?;
        log::debug!("saved snapshot ({} bytes)", raw.len());
        Ok(())
    }

    /// Forget everything stored for this learner.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; a missing snapshot is not an error.
    pub async fn clear(&self) -> Result<(), StorageError> {
        match self.kv.delete(&self.key).await {
            Ok(()) | Err(StorageError::NotFound) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
