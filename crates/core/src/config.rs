use std::time::Duration;

use crate::storage::scheduler::DEFAULT_SAVE_DEBOUNCE;

/// Well-known key the snapshot is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "allocation-tracker/snapshot";

/// How a persisted tracker talks to its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub storage_key: String,
    /// Quiet period after the last mutation before the snapshot is written.
    pub save_debounce: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
        }
    }
}

impl TrackerConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_save_debounce(mut self, delay: Duration) -> Self {
        self.save_debounce = delay;
        self
    }
}
