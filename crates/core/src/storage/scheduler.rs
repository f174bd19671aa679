use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::manager::StorageManager;
use super::traits::SnapshotStore;

/// Quiet period after the last change before a snapshot is written.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// What the presentation layer needs for a "saving…" indicator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveStatus {
    /// A save is scheduled but has not been written yet.
    pub pending: bool,
    /// Tracker version of the last snapshot written successfully.
    pub saved_version: Option<u64>,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Message of the last failed write, cleared by the next success.
    pub last_error: Option<String>,
}

/// Debounced snapshot writer.
///
/// Every `schedule` call cancels the outstanding timer and starts a new one;
/// only the last snapshot of a burst is written. Dropping the scheduler
/// cancels the timer, so nothing is written after its owner is gone.
pub struct SaveScheduler {
    store: Arc<dyn SnapshotStore>,
    key: String,
    delay: Duration,
    runtime: Handle,
    status: Arc<watch::Sender<SaveStatus>>,
    /// Bumped on every schedule/flush/cancel. A timer only writes while its
    /// own generation is still current; the lock also serializes writes.
    generation: Arc<Mutex<u64>>,
    timer: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SaveScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveScheduler")
            .field("store", &self.store.name())
            .field("key", &self.key)
            .field("delay", &self.delay)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

impl SaveScheduler {
    /// Must be called from within a Tokio runtime; the timer tasks are
    /// spawned on that runtime.
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
        delay: Duration,
    ) -> Result<Self, CoreError> {
        let runtime = Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;
        let (status, _) = watch::channel(SaveStatus::default());

        Ok(Self {
            store,
            key: key.into(),
            delay,
            runtime,
            status: Arc::new(status),
            generation: Arc::new(Mutex::new(0)),
            timer: None,
        })
    }

    /// (Re)start the timer for `snapshot`, replacing any earlier pending one.
    pub fn schedule(&mut self, snapshot: Portfolio, version: u64) {
        let generation = self.next_generation();
        self.status.send_modify(|s| s.pending = true);

        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let status = Arc::clone(&self.status);
        let current = Arc::clone(&self.generation);
        let delay = self.delay;

        self.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            // No await from here on: once the timer fired the write runs to
            // completion even if the task is aborted meanwhile.
            let guard = current.lock().unwrap_or_else(|p| p.into_inner());
            if *guard != generation {
                return;
            }
            let result = StorageManager::save(store.as_ref(), &key, &snapshot);
            record(&status, version, &result);
            drop(guard);
        }));
    }

    /// Write `snapshot` right now, cancelling any pending timer.
    pub fn flush(&mut self, snapshot: &Portfolio, version: u64) -> Result<(), CoreError> {
        self.abort_timer();
        let mut guard = self.generation.lock().unwrap_or_else(|p| p.into_inner());
        *guard += 1;
        let result = StorageManager::save(self.store.as_ref(), &self.key, snapshot);
        record(&self.status, version, &result);
        drop(guard);
        result
    }

    /// Drop the pending save, if any, without writing.
    pub fn cancel(&mut self) {
        if self.timer.is_some() {
            debug!("Pending save of '{}' cancelled", self.key);
        }
        self.next_generation();
        self.status.send_modify(|s| s.pending = false);
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.borrow().pending
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Receiver that sees every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.abort_timer();
        let mut guard = self.generation.lock().unwrap_or_else(|p| p.into_inner());
        *guard += 1;
        *guard
    }
}

impl Drop for SaveScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn record(status: &watch::Sender<SaveStatus>, version: u64, result: &Result<(), CoreError>) {
    match result {
        Ok(()) => {
            debug!("Snapshot version {version} saved");
            status.send_modify(|s| {
                s.pending = false;
                s.saved_version = Some(version);
                s.last_saved_at = Some(Utc::now());
                s.last_error = None;
            });
        }
        Err(e) => {
            warn!("Failed to save snapshot version {version}: {e}");
            status.send_modify(|s| {
                s.pending = false;
                s.last_error = Some(e.to_string());
            });
        }
    }
}
