use log::{info, warn};

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::traits::SnapshotStore;

/// High-level snapshot operations: encode/decode a portfolio and move it
/// through a `SnapshotStore`.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a portfolio to its JSON snapshot.
    ///
    /// Flow: Portfolio → serde_json → `{settings, assets, groups, tags, activeView}`
    pub fn encode(portfolio: &Portfolio) -> Result<String, CoreError> {
        serde_json::to_string(portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))
    }

    /// Parse a JSON snapshot and repair any integrity issues it carries.
    pub fn decode(payload: &str) -> Result<Portfolio, CoreError> {
        let mut portfolio: Portfolio = serde_json::from_str(payload).map_err(|e| {
            CoreError::Deserialization(format!("Failed to deserialize portfolio: {e}"))
        })?;
        portfolio.repair();
        Ok(portfolio)
    }

    /// Encode and write a portfolio under `key`.
    pub fn save(
        store: &dyn SnapshotStore,
        key: &str,
        portfolio: &Portfolio,
    ) -> Result<(), CoreError> {
        let payload = Self::encode(portfolio)?;
        store.write(key, &payload).map_err(|e| match e {
            CoreError::Storage { .. } => e,
            other => CoreError::Storage {
                store: store.name().to_string(),
                message: other.to_string(),
            },
        })
    }

    /// Read and decode the snapshot under `key`.
    ///
    /// Fails soft: a missing, unreadable or corrupt snapshot yields `None`
    /// and is logged, never returned as an error.
    pub fn load(store: &dyn SnapshotStore, key: &str) -> Option<Portfolio> {
        let payload = match store.read(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!("No snapshot under '{key}' in {} store", store.name());
                return None;
            }
            Err(e) => {
                warn!("Failed to read snapshot '{key}' from {} store: {e}", store.name());
                return None;
            }
        };

        match Self::decode(&payload) {
            Ok(portfolio) => {
                info!(
                    "Loaded snapshot '{key}': {} asset(s), {} group(s), {} tag(s)",
                    portfolio.assets.len(),
                    portfolio.groups.len(),
                    portfolio.tags.len()
                );
                Some(portfolio)
            }
            Err(e) => {
                warn!("Discarding corrupt snapshot '{key}': {e}");
                None
            }
        }
    }

    /// `load`, falling back to the built-in defaults.
    pub fn load_or_default(store: &dyn SnapshotStore, key: &str) -> Portfolio {
        Self::load(store, key).unwrap_or_else(|| {
            info!("Using built-in default portfolio");
            Portfolio::default()
        })
    }
}
