#![forbid(unsafe_code)]

pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use repository::{InMemoryRepository, KeyValueStore, Storage, StorageError};
pub use snapshot::{SNAPSHOT_KEY, SnapshotStore};
