use crate::errors::CoreError;

/// Durable key/value storage for serialized snapshots.
///
/// Implementations only move strings around; encoding and decoding live in
/// `StorageManager`. Swapping the backend (browser storage, a file, a test
/// double) leaves the rest of the crate untouched.
pub trait SnapshotStore: Send + Sync {
    /// Human-readable name of this store (for logs/errors).
    fn name(&self) -> &str;

    /// Read the payload stored under `key`, `None` if nothing was stored.
    fn read(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Replace the payload stored under `key`.
    fn write(&self, key: &str, payload: &str) -> Result<(), CoreError>;
}
