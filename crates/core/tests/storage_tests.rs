// ═══════════════════════════════════════════════════════════════════
// Storage Tests — MemoryStore, FileStore, StorageManager, SaveScheduler
// ═══════════════════════════════════════════════════════════════════

use std::sync::Arc;
use std::time::Duration;

use allocation_tracker_core::errors::CoreError;
use allocation_tracker_core::models::asset::Asset;
use allocation_tracker_core::models::group::ViewMode;
use allocation_tracker_core::models::portfolio::Portfolio;
use allocation_tracker_core::storage::file::FileStore;
use allocation_tracker_core::storage::manager::StorageManager;
use allocation_tracker_core::storage::memory::MemoryStore;
use allocation_tracker_core::storage::scheduler::{SaveScheduler, DEFAULT_SAVE_DEBOUNCE};
use allocation_tracker_core::storage::traits::SnapshotStore;

const KEY: &str = "test/snapshot";

/// Store whose writes always fail.
struct BrokenStore;

impl SnapshotStore for BrokenStore {
    fn name(&self) -> &str {
        "broken"
    }

    fn read(&self, _key: &str) -> Result<Option<String>, CoreError> {
        Err(CoreError::FileIO("disk on fire".into()))
    }

    fn write(&self, _key: &str, _payload: &str) -> Result<(), CoreError> {
        Err(CoreError::FileIO("disk full".into()))
    }
}

/// Let spawned tasks run after the paused clock moved.
async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn read_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.read(KEY).unwrap(), None);
    }

    #[test]
    fn write_then_read() {
        let store = MemoryStore::new();
        store.write(KEY, "payload").unwrap();
        assert_eq!(store.read(KEY).unwrap().as_deref(), Some("payload"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.write(KEY, "x").unwrap();
        assert_eq!(handle.get(KEY).as_deref(), Some("x"));
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn insert_is_not_a_write() {
        let store = MemoryStore::new();
        store.insert(KEY, "seed");
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.get(KEY).as_deref(), Some("seed"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// FileStore
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[test]
    fn key_is_sanitized_into_file_name() {
        let store = FileStore::new("/tmp/somewhere");
        let path = store.path_for("allocation-tracker/snapshot");
        assert_eq!(path.file_name().unwrap(), "allocation-tracker_snapshot.json");
    }

    #[test]
    fn read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.read(KEY).unwrap(), None);
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.write(KEY, "{\"a\":1}").unwrap();
        assert_eq!(store.read(KEY).unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(store.path_for(KEY).exists());
    }

    #[test]
    fn overwrite_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write(KEY, "one").unwrap();
        store.write(KEY, "two").unwrap();
        assert_eq!(store.read(KEY).unwrap().as_deref(), Some("two"));
        assert!(!store.path_for(KEY).with_extension("json.tmp").exists());
    }
}

// ═══════════════════════════════════════════════════════════════════
// StorageManager
// ═══════════════════════════════════════════════════════════════════

mod storage_manager {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let mut p = Portfolio::default();
        p.active_view = ViewMode::Structural;
        p.assets.push(Asset::with_id("x", "X", 123.456).target(3.5).tagged(["tag-value"]));

        let json = StorageManager::encode(&p).unwrap();
        let back = StorageManager::decode(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(matches!(
            StorageManager::decode("not json"),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn decode_repairs_dangling_tags() {
        let mut p = Portfolio::default();
        p.assets[0].tag_ids.push("tag-ghost".into());
        let json = serde_json::to_string(&p).unwrap();

        let back = StorageManager::decode(&json).unwrap();
        assert!(!back.assets[0].has_tag("tag-ghost"));
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let mut p = Portfolio::default();
        p.settings.planned_total = 42.0;

        StorageManager::save(&store, KEY, &p).unwrap();
        assert_eq!(StorageManager::load(&store, KEY), Some(p));
    }

    #[test]
    fn load_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(StorageManager::load(&store, KEY), None);
    }

    #[test]
    fn load_corrupt_is_none() {
        let store = MemoryStore::new();
        store.insert(KEY, "{\"settings\": 12");
        assert_eq!(StorageManager::load(&store, KEY), None);
    }

    #[test]
    fn load_read_error_is_none() {
        assert_eq!(StorageManager::load(&BrokenStore, KEY), None);
    }

    #[test]
    fn load_or_default_falls_back() {
        let store = MemoryStore::new();
        store.insert(KEY, "[]");
        let p = StorageManager::load_or_default(&store, KEY);
        assert_eq!(p, Portfolio::default());
        assert_eq!(p.active_view, ViewMode::Attribution);
    }

    #[test]
    fn save_error_names_store() {
        let err = StorageManager::save(&BrokenStore, KEY, &Portfolio::default()).unwrap_err();
        match err {
            CoreError::Storage { store, message } => {
                assert_eq!(store, "broken");
                assert!(message.contains("disk full"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// SaveScheduler
// ═══════════════════════════════════════════════════════════════════

mod save_scheduler {
    use super::*;

    fn scheduler(store: &MemoryStore) -> SaveScheduler {
        SaveScheduler::new(Arc::new(store.clone()), KEY, DEFAULT_SAVE_DEBOUNCE).unwrap()
    }

    fn with_total(total: f64) -> Portfolio {
        let mut p = Portfolio::default();
        p.settings.planned_total = total;
        p
    }

    #[test]
    fn new_outside_runtime_fails() {
        let result = SaveScheduler::new(Arc::new(MemoryStore::new()), KEY, DEFAULT_SAVE_DEBOUNCE);
        assert!(matches!(result, Err(CoreError::Runtime(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn writes_after_quiet_period() {
        let store = MemoryStore::new();
        let mut saver = scheduler(&store);

        saver.schedule(with_total(1.0), 1);
        assert!(saver.is_pending());

        tokio::time::sleep(Duration::from_millis(999)).await;
        settle().await;
        assert_eq!(store.write_count(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(store.write_count(), 1);
        assert!(!saver.is_pending());

        let status = saver.status();
        assert_eq!(status.saved_version, Some(1));
        assert!(status.last_saved_at.is_some());
        assert!(status.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn burst_writes_only_last_snapshot() {
        let store = MemoryStore::new();
        let mut saver = scheduler(&store);

        for i in 1..=10 {
            saver.schedule(with_total(i as f64), i);
        }

        tokio::time::sleep(Duration::from_millis(1500)).await;
        settle().await;

        assert_eq!(store.write_count(), 1);
        let saved = StorageManager::load(&store, KEY).unwrap();
        assert_eq!(saved.settings.planned_total, 10.0);
        assert_eq!(saver.status().saved_version, Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn each_schedule_resets_timer() {
        let store = MemoryStore::new();
        let mut saver = scheduler(&store);

        saver.schedule(with_total(1.0), 1);
        tokio::time::sleep(Duration::from_millis(600)).await;
        saver.schedule(with_total(2.0), 2);
        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(store.write_count(), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_write() {
        let store = MemoryStore::new();
        let mut saver = scheduler(&store);

        saver.schedule(with_total(1.0), 1);
        saver.cancel();
        assert!(!saver.is_pending());

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_prevents_write() {
        let store = MemoryStore::new();
        let mut saver = scheduler(&store);
        saver.schedule(with_total(1.0), 1);
        drop(saver);

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately_and_cancels_timer() {
        let store = MemoryStore::new();
        let mut saver = scheduler(&store);

        saver.schedule(with_total(1.0), 1);
        saver.flush(&with_total(2.0), 2).unwrap();
        assert_eq!(store.write_count(), 1);
        assert!(!saver.is_pending());

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(store.write_count(), 1);
        let saved = StorageManager::load(&store, KEY).unwrap();
        assert_eq!(saved.settings.planned_total, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_recorded() {
        let mut saver =
            SaveScheduler::new(Arc::new(BrokenStore), KEY, DEFAULT_SAVE_DEBOUNCE).unwrap();

        saver.schedule(with_total(1.0), 1);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;

        let status = saver.status();
        assert!(!status.pending);
        assert_eq!(status.saved_version, None);
        assert!(status.last_error.unwrap().contains("disk full"));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_pending_flag() {
        let store = MemoryStore::new();
        let mut saver = scheduler(&store);
        let mut rx = saver.subscribe();

        saver.schedule(with_total(1.0), 1);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().pending);

        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().pending);
        assert_eq!(store.write_count(), 1);
    }
}
