use kanji_core::model::Grade;
use kanji_core::scheduler::Scheduler;
use kanji_core::snapshot::StudyState;
use kanji_core::time::fixed_now;
use storage::repository::{KeyValueStore, Storage, StorageError};
use storage::snapshot::SnapshotStore;
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_kv_upserts_and_deletes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrations are idempotent");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.put("profile", "a").await.unwrap();
    repo.put("profile", "b").await.unwrap();
    assert_eq!(repo.get("profile").await.unwrap().as_deref(), Some("b"));

    repo.delete("profile").await.unwrap();
    assert!(matches!(
        repo.delete("profile").await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_snapshot_survives_reconnect() {
    let url = "sqlite:file:memdb_snapshot?mode=memory&cache=shared";
    let first = Storage::sqlite(url).await.expect("open");

    let scheduler = Scheduler::new();
    let now = fixed_now();
    let mut state = StudyState::new();
    state.reviews.seed(&scheduler, ["花", "空"], now);
    scheduler
        .record_result(&mut state.reviews, "花", true, now)
        .unwrap();
    state
        .mistakes
        .add_external_mistakes(["空"], Grade::new(1).ok(), None);
    state.score.record_answer(true);

    SnapshotStore::from_storage(&first)
        .save(&state.to_snapshot())
        .await
        .unwrap();

    // Keep `first` alive so the shared in-memory database is not dropped.
    let second = Storage::sqlite(url).await.expect("reopen");
    let loaded = SnapshotStore::from_storage(&second)
        .load()
        .await
        .unwrap()
        .expect("snapshot stored");

    let restored = StudyState::from_snapshot(loaded, &scheduler);
    assert_eq!(restored.reviews.box_level_of("花"), 1);
    assert_eq!(restored.mistakes.external().len(), 1);
    assert_eq!(restored.score.streak().max, 1);
    drop(first);
}
