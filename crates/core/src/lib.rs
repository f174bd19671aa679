pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::cell::OnceCell;
use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use config::TrackerConfig;
use errors::{CoreError, EntityKind};
use models::{
    asset::Asset,
    group::{Group, ViewMode},
    metrics::Calculated,
    portfolio::Portfolio,
    settings::{GlobalSettings, SettingsPatch},
    tag::Tag,
};
use services::{
    attribution_service::AttributionService, derivation_service::DerivationService,
    portfolio_service::PortfolioService, report_service::ReportService,
};
use storage::{
    manager::StorageManager,
    scheduler::{SaveScheduler, SaveStatus},
    traits::SnapshotStore,
};

/// A group is flagged as "consider topping up" once its gap exceeds this
/// many base-currency units.
pub const UNDERWEIGHT_GAP_THRESHOLD: f64 = 1000.0;

/// Main entry point for the Allocation Tracker core library.
///
/// Owns the portfolio state. Readers get shared references only; every
/// change goes through the mutation methods below, each of which bumps the
/// version, invalidates the cached view model, notifies subscribers and (when
/// persistence is attached) schedules a debounced save.
#[must_use]
pub struct AllocationTracker {
    portfolio: Portfolio,
    portfolio_service: PortfolioService,
    derivation_service: DerivationService,
    attribution_service: AttributionService,
    report_service: ReportService,
    /// Memoized view model, reset on every mutation.
    calculated: OnceCell<Calculated>,
    version: u64,
    changes: watch::Sender<u64>,
    saver: Option<SaveScheduler>,
}

impl std::fmt::Debug for AllocationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationTracker")
            .field("assets", &self.portfolio.assets.len())
            .field("groups", &self.portfolio.groups.len())
            .field("tags", &self.portfolio.tags.len())
            .field("active_view", &self.portfolio.active_view)
            .field("version", &self.version)
            .field("saver", &self.saver)
            .finish()
    }
}

impl AllocationTracker {
    /// Tracker seeded with the built-in defaults, without persistence.
    pub fn new() -> Self {
        Self::build(Portfolio::default(), None)
    }

    /// Tracker over an existing portfolio, without persistence.
    /// The portfolio is repaired first so the integrity invariants hold.
    pub fn from_portfolio(mut portfolio: Portfolio) -> Self {
        portfolio.repair();
        Self::build(portfolio, None)
    }

    /// Load the snapshot from `store` (defaults if missing or corrupt) and
    /// save back to it after every burst of changes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(store: Arc<dyn SnapshotStore>, config: TrackerConfig) -> Result<Self, CoreError> {
        let portfolio = StorageManager::load_or_default(store.as_ref(), &config.storage_key);
        let saver = SaveScheduler::new(store, config.storage_key, config.save_debounce)?;
        info!("Allocation tracker opened with {:?}", saver);
        Ok(Self::build(portfolio, Some(saver)))
    }

    // ── State (read-only) ───────────────────────────────────────────

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    #[must_use]
    pub fn settings(&self) -> &GlobalSettings {
        &self.portfolio.settings
    }

    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.portfolio.assets
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.portfolio.groups
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.portfolio.tags
    }

    #[must_use]
    pub fn active_view(&self) -> ViewMode {
        self.portfolio.active_view
    }

    #[must_use]
    pub fn asset(&self, asset_id: &str) -> Option<&Asset> {
        self.portfolio.asset(asset_id)
    }

    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.portfolio.group(group_id)
    }

    #[must_use]
    pub fn tag(&self, tag_id: &str) -> Option<&Tag> {
        self.portfolio.tag(tag_id)
    }

    /// Groups shown under the active view mode.
    #[must_use]
    pub fn active_groups(&self) -> Vec<&Group> {
        let view = self.portfolio.active_view;
        self.portfolio
            .groups
            .iter()
            .filter(|g| g.view_type == view)
            .collect()
    }

    /// Effective members of a group under its own view type.
    pub fn members(&self, group_id: &str) -> Result<Vec<&Asset>, CoreError> {
        let group = self
            .portfolio
            .group(group_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Group, group_id))?;
        Ok(self
            .attribution_service
            .members(group, &self.portfolio.assets))
    }

    // ── Derived view model ──────────────────────────────────────────

    /// The view model for the current state, computed on first read after
    /// each mutation and reused until the next one.
    #[must_use]
    pub fn calculated(&self) -> &Calculated {
        self.calculated
            .get_or_init(|| self.derivation_service.calculate(&self.portfolio))
    }

    /// First active group whose gap exceeds `UNDERWEIGHT_GAP_THRESHOLD`.
    #[must_use]
    pub fn underweight_suggestion(&self) -> Option<&Group> {
        let calculated = self.calculated();
        self.active_groups().into_iter().find(|g| {
            calculated
                .group(&g.id)
                .is_some_and(|m| m.gap > UNDERWEIGHT_GAP_THRESHOLD)
        })
    }

    /// Plain-text summary of the current metrics.
    #[must_use]
    pub fn summary_report(&self) -> String {
        self.report_service
            .portfolio_summary(&self.portfolio, self.calculated())
    }

    // ── Change notification ─────────────────────────────────────────

    /// Increases by one with every successful mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Receiver that observes the version after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    // ── Settings & view ─────────────────────────────────────────────

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.portfolio_service
            .update_settings(&mut self.portfolio, &patch);
        self.commit();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.portfolio_service
            .set_view_mode(&mut self.portfolio, mode);
        self.commit();
    }

    // ── Assets ──────────────────────────────────────────────────────

    /// Set an asset's market value. Negative or non-numeric input becomes 0.
    pub fn update_asset(&mut self, asset_id: &str, value: f64) -> Result<(), CoreError> {
        self.portfolio_service
            .update_asset_value(&mut self.portfolio, asset_id, value)?;
        self.commit();
        Ok(())
    }

    pub fn update_asset_target(
        &mut self,
        asset_id: &str,
        target_percent: f64,
    ) -> Result<(), CoreError> {
        self.portfolio_service
            .update_asset_target(&mut self.portfolio, asset_id, target_percent)?;
        self.commit();
        Ok(())
    }

    pub fn rename_asset(&mut self, asset_id: &str, name: &str) -> Result<(), CoreError> {
        self.portfolio_service
            .rename_asset(&mut self.portfolio, asset_id, name)?;
        self.commit();
        Ok(())
    }

    /// Create an asset through a group; returns the new asset's id.
    pub fn add_asset_to_group(&mut self, group_id: &str, name: &str) -> Result<String, CoreError> {
        let id = self
            .portfolio_service
            .add_asset_to_group(&mut self.portfolio, group_id, name)?;
        self.commit();
        Ok(id)
    }

    pub fn delete_asset_from_group(
        &mut self,
        group_id: &str,
        asset_id: &str,
    ) -> Result<(), CoreError> {
        self.portfolio_service
            .delete_asset_from_group(&mut self.portfolio, group_id, asset_id)?;
        self.commit();
        Ok(())
    }

    pub fn delete_asset(&mut self, asset_id: &str) -> Result<Asset, CoreError> {
        let removed = self
            .portfolio_service
            .delete_asset(&mut self.portfolio, asset_id)?;
        self.commit();
        Ok(removed)
    }

    pub fn add_tag_to_asset(&mut self, asset_id: &str, tag_id: &str) -> Result<(), CoreError> {
        let added = self
            .portfolio_service
            .add_tag_to_asset(&mut self.portfolio, asset_id, tag_id)?;
        if added {
            self.commit();
        }
        Ok(())
    }

    pub fn remove_tag_from_asset(&mut self, asset_id: &str, tag_id: &str) -> Result<(), CoreError> {
        let removed = self
            .portfolio_service
            .remove_tag_from_asset(&mut self.portfolio, asset_id, tag_id)?;
        if removed {
            self.commit();
        }
        Ok(())
    }

    pub fn add_all_tags_to_asset(&mut self, asset_id: &str) -> Result<(), CoreError> {
        self.portfolio_service
            .add_all_tags_to_asset(&mut self.portfolio, asset_id)?;
        self.commit();
        Ok(())
    }

    // ── Groups ──────────────────────────────────────────────────────

    /// Returns the new group's id.
    pub fn create_group(&mut self, name: &str, view_type: ViewMode) -> Result<String, CoreError> {
        let id = self
            .portfolio_service
            .create_group(&mut self.portfolio, name, view_type)?;
        self.commit();
        Ok(id)
    }

    pub fn rename_group(
        &mut self,
        group_id: &str,
        name: &str,
        description: &str,
    ) -> Result<(), CoreError> {
        self.portfolio_service
            .rename_group(&mut self.portfolio, group_id, name, description)?;
        self.commit();
        Ok(())
    }

    pub fn update_group_target(
        &mut self,
        group_id: &str,
        target_percent: f64,
    ) -> Result<(), CoreError> {
        self.portfolio_service
            .update_group_target(&mut self.portfolio, group_id, target_percent)?;
        self.commit();
        Ok(())
    }

    pub fn update_group_tags(
        &mut self,
        group_id: &str,
        tag_ids: Vec<String>,
    ) -> Result<(), CoreError> {
        self.portfolio_service
            .update_group_tags(&mut self.portfolio, group_id, tag_ids)?;
        self.commit();
        Ok(())
    }

    /// Remove a group; its member assets are kept.
    pub fn delete_group(&mut self, group_id: &str) -> Result<Group, CoreError> {
        let removed = self
            .portfolio_service
            .delete_group(&mut self.portfolio, group_id)?;
        self.commit();
        Ok(removed)
    }

    // ── Tags ────────────────────────────────────────────────────────

    /// Returns the new tag's id.
    pub fn create_tag(&mut self, name: &str, color: &str) -> Result<String, CoreError> {
        let id = self
            .portfolio_service
            .create_tag(&mut self.portfolio, name, color)?;
        self.commit();
        Ok(id)
    }

    pub fn update_tag(&mut self, tag_id: &str, name: &str, color: &str) -> Result<(), CoreError> {
        self.portfolio_service
            .update_tag(&mut self.portfolio, tag_id, name, color)?;
        self.commit();
        Ok(())
    }

    /// Delete a tag and purge it from every asset and group.
    pub fn delete_tag(&mut self, tag_id: &str) -> Result<Tag, CoreError> {
        let removed = self
            .portfolio_service
            .delete_tag(&mut self.portfolio, tag_id)?;
        self.commit();
        Ok(removed)
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// `true` while a debounced save is waiting to be written.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saver.as_ref().is_some_and(SaveScheduler::is_pending)
    }

    /// `None` when the tracker has no store attached.
    #[must_use]
    pub fn save_status(&self) -> Option<SaveStatus> {
        self.saver.as_ref().map(SaveScheduler::status)
    }

    #[must_use]
    pub fn subscribe_save_status(&self) -> Option<watch::Receiver<SaveStatus>> {
        self.saver.as_ref().map(SaveScheduler::subscribe)
    }

    /// Returns `true` if the state changed since it was last written
    /// (or since the tracker was created, when no store is attached).
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        let saved = self
            .saver
            .as_ref()
            .and_then(|s| s.status().saved_version)
            .unwrap_or(0);
        self.version > saved
    }

    /// Write the current state immediately instead of waiting for the
    /// debounce timer. No-op without a store.
    pub fn flush_save(&mut self) -> Result<(), CoreError> {
        match self.saver.as_mut() {
            Some(saver) => saver.flush(&self.portfolio, self.version),
            None => Ok(()),
        }
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// The current state as a JSON snapshot.
    pub fn to_json(&self) -> Result<String, CoreError> {
        StorageManager::encode(&self.portfolio)
    }

    /// Replace the whole state with a JSON snapshot (repaired on the way in).
    /// On a parse error the current state is kept.
    pub fn import_json(&mut self, json: &str) -> Result<(), CoreError> {
        self.portfolio = StorageManager::decode(json)?;
        self.commit();
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio, saver: Option<SaveScheduler>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            portfolio,
            portfolio_service: PortfolioService::new(),
            derivation_service: DerivationService::new(),
            attribution_service: AttributionService::new(),
            report_service: ReportService::new(),
            calculated: OnceCell::new(),
            version: 0,
            changes,
            saver,
        }
    }

    /// Called after every successful mutation.
    fn commit(&mut self) {
        self.calculated = OnceCell::new();
        self.version += 1;
        self.changes.send_replace(self.version);
        if let Some(saver) = self.saver.as_mut() {
            saver.schedule(self.portfolio.clone(), self.version);
        }
    }
}

impl Default for AllocationTracker {
    fn default() -> Self {
        Self::new()
    }
}
