use log::debug;

use crate::errors::{CoreError, EntityKind};
use crate::models::asset::Asset;
use crate::models::defaults;
use crate::models::group::{Group, ViewMode};
use crate::models::portfolio::Portfolio;
use crate::models::settings::SettingsPatch;
use crate::models::tag::{dedup_ids, insert_id, remove_id, Tag};

/// Every state transition of the portfolio.
///
/// Pure business logic, no I/O. Each method either applies its whole change
/// or returns an error and leaves the portfolio untouched. Ids that do not
/// exist are reported as `CoreError::NotFound`.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Shallow-merge `patch` into the global settings.
    pub fn update_settings(&self, portfolio: &mut Portfolio, patch: &SettingsPatch) {
        portfolio.settings.apply(patch);
        debug!("Settings updated: {patch:?}");
    }

    /// Switch the active display filter. Stored entities are not affected.
    pub fn set_view_mode(&self, portfolio: &mut Portfolio, mode: ViewMode) {
        portfolio.active_view = mode;
    }

    // ── Assets ──────────────────────────────────────────────────────

    /// Set an asset's market value. Negative or non-numeric input becomes 0.
    pub fn update_asset_value(
        &self,
        portfolio: &mut Portfolio,
        asset_id: &str,
        value: f64,
    ) -> Result<(), CoreError> {
        let asset = Self::asset_mut(portfolio, asset_id)?;
        asset.value = non_negative(value);
        Ok(())
    }

    /// Set an asset's target share of the planned total, clamped to 0..=100.
    pub fn update_asset_target(
        &self,
        portfolio: &mut Portfolio,
        asset_id: &str,
        target_percent: f64,
    ) -> Result<(), CoreError> {
        let asset = Self::asset_mut(portfolio, asset_id)?;
        asset.target_percent = clamp_percent(target_percent);
        Ok(())
    }

    pub fn rename_asset(
        &self,
        portfolio: &mut Portfolio,
        asset_id: &str,
        name: &str,
    ) -> Result<(), CoreError> {
        let name = validate_name(name, "Asset")?;
        let asset = Self::asset_mut(portfolio, asset_id)?;
        asset.name = name;
        Ok(())
    }

    /// Create a new asset through a group.
    ///
    /// - Attribution group: the asset inherits a copy of the group's tags, so
    ///   it attributes into the group immediately. No `asset_ids` list changes.
    /// - Structural group: the asset is appended to the group's `asset_ids`
    ///   and starts without tags.
    ///
    /// Returns the new asset's id.
    pub fn add_asset_to_group(
        &self,
        portfolio: &mut Portfolio,
        group_id: &str,
        name: &str,
    ) -> Result<String, CoreError> {
        let name = validate_name(name, "Asset")?;
        let group_idx = Self::group_index(portfolio, group_id)?;

        let mut asset = Asset::new(name);
        let asset_id = asset.id.clone();
        let group = &mut portfolio.groups[group_idx];

        match group.view_type {
            ViewMode::Attribution => asset.tag_ids = group.tag_ids.clone(),
            ViewMode::Structural => group.asset_ids.push(asset_id.clone()),
        }

        debug!(
            "Asset '{}' ({asset_id}) added via {} group {group_id}",
            asset.name, group.view_type
        );
        portfolio.assets.push(asset);
        Ok(asset_id)
    }

    /// Drop an asset from a group's explicit member list.
    /// The asset itself, its value and its tags are kept.
    pub fn delete_asset_from_group(
        &self,
        portfolio: &mut Portfolio,
        group_id: &str,
        asset_id: &str,
    ) -> Result<(), CoreError> {
        let group = Self::group_mut(portfolio, group_id)?;
        if !remove_id(&mut group.asset_ids, asset_id) {
            return Err(CoreError::not_found(EntityKind::Asset, asset_id));
        }
        Ok(())
    }

    /// Delete an asset entirely, removing it from every group's member list.
    /// Returns the removed asset.
    pub fn delete_asset(
        &self,
        portfolio: &mut Portfolio,
        asset_id: &str,
    ) -> Result<Asset, CoreError> {
        let idx = portfolio
            .assets
            .iter()
            .position(|a| a.id == asset_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Asset, asset_id))?;

        let removed = portfolio.assets.remove(idx);
        for group in &mut portfolio.groups {
            remove_id(&mut group.asset_ids, asset_id);
        }
        debug!("Asset '{}' ({asset_id}) deleted", removed.name);
        Ok(removed)
    }

    // ── Asset tags ──────────────────────────────────────────────────

    /// Add one tag to an asset. Idempotent: returns `false` if it was already there.
    pub fn add_tag_to_asset(
        &self,
        portfolio: &mut Portfolio,
        asset_id: &str,
        tag_id: &str,
    ) -> Result<bool, CoreError> {
        Self::ensure_tag(portfolio, tag_id)?;
        let asset = Self::asset_mut(portfolio, asset_id)?;
        Ok(insert_id(&mut asset.tag_ids, tag_id))
    }

    /// Remove one tag from an asset. Returns `false` if the asset did not carry it.
    pub fn remove_tag_from_asset(
        &self,
        portfolio: &mut Portfolio,
        asset_id: &str,
        tag_id: &str,
    ) -> Result<bool, CoreError> {
        Self::ensure_tag(portfolio, tag_id)?;
        let asset = Self::asset_mut(portfolio, asset_id)?;
        Ok(remove_id(&mut asset.tag_ids, tag_id))
    }

    /// Replace the asset's tags with every tag that currently exists.
    pub fn add_all_tags_to_asset(
        &self,
        portfolio: &mut Portfolio,
        asset_id: &str,
    ) -> Result<(), CoreError> {
        let all: Vec<String> = portfolio.tags.iter().map(|t| t.id.clone()).collect();
        let asset = Self::asset_mut(portfolio, asset_id)?;
        asset.tag_ids = all;
        Ok(())
    }

    // ── Groups ──────────────────────────────────────────────────────

    /// Create an empty group with zero target. The theme color cycles
    /// through the palette by the number of existing groups.
    /// Returns the new group's id.
    pub fn create_group(
        &self,
        portfolio: &mut Portfolio,
        name: &str,
        view_type: ViewMode,
    ) -> Result<String, CoreError> {
        let name = validate_name(name, "Group")?;
        let color = defaults::theme_color_for(portfolio.groups.len());
        let group = Group::new(name, view_type, color);
        let id = group.id.clone();
        debug!("Group '{}' ({id}) created as {view_type}", group.name);
        portfolio.groups.push(group);
        Ok(id)
    }

    pub fn rename_group(
        &self,
        portfolio: &mut Portfolio,
        group_id: &str,
        name: &str,
        description: &str,
    ) -> Result<(), CoreError> {
        let name = validate_name(name, "Group")?;
        let group = Self::group_mut(portfolio, group_id)?;
        group.name = name;
        group.description = description.trim().to_string();
        Ok(())
    }

    /// Set a group's target percent, clamped to 0..=100.
    pub fn update_group_target(
        &self,
        portfolio: &mut Portfolio,
        group_id: &str,
        target_percent: f64,
    ) -> Result<(), CoreError> {
        let group = Self::group_mut(portfolio, group_id)?;
        group.target_percent = clamp_percent(target_percent);
        Ok(())
    }

    /// Replace a group's tag set. Every id must name an existing tag;
    /// duplicates are collapsed.
    pub fn update_group_tags(
        &self,
        portfolio: &mut Portfolio,
        group_id: &str,
        tag_ids: Vec<String>,
    ) -> Result<(), CoreError> {
        for tag_id in &tag_ids {
            Self::ensure_tag(portfolio, tag_id)?;
        }
        let group = Self::group_mut(portfolio, group_id)?;
        group.tag_ids = dedup_ids(tag_ids);
        Ok(())
    }

    /// Remove a group. Its member assets stay in the portfolio.
    /// Returns the removed group.
    pub fn delete_group(
        &self,
        portfolio: &mut Portfolio,
        group_id: &str,
    ) -> Result<Group, CoreError> {
        let idx = Self::group_index(portfolio, group_id)?;
        let removed = portfolio.groups.remove(idx);
        debug!("Group '{}' ({group_id}) deleted", removed.name);
        Ok(removed)
    }

    // ── Tags ────────────────────────────────────────────────────────

    /// Returns the new tag's id.
    pub fn create_tag(
        &self,
        portfolio: &mut Portfolio,
        name: &str,
        color: &str,
    ) -> Result<String, CoreError> {
        let name = validate_name(name, "Tag")?;
        let tag = Tag::new(name, color.trim());
        let id = tag.id.clone();
        portfolio.tags.push(tag);
        Ok(id)
    }

    pub fn update_tag(
        &self,
        portfolio: &mut Portfolio,
        tag_id: &str,
        name: &str,
        color: &str,
    ) -> Result<(), CoreError> {
        let name = validate_name(name, "Tag")?;
        let tag = portfolio
            .tags
            .iter_mut()
            .find(|t| t.id == tag_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Tag, tag_id))?;
        tag.name = name;
        tag.color = color.trim().to_string();
        Ok(())
    }

    /// Delete a tag and purge its id from every asset and every group.
    ///
    /// The existence check is the only failure point, so either all three
    /// collections change or none do. Returns the removed tag.
    pub fn delete_tag(&self, portfolio: &mut Portfolio, tag_id: &str) -> Result<Tag, CoreError> {
        let idx = portfolio
            .tags
            .iter()
            .position(|t| t.id == tag_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Tag, tag_id))?;

        let removed = portfolio.tags.remove(idx);
        let assets_touched = portfolio
            .assets
            .iter_mut()
            .map(|a| remove_id(&mut a.tag_ids, tag_id))
            .filter(|removed| *removed)
            .count();
        let groups_touched = portfolio
            .groups
            .iter_mut()
            .map(|g| remove_id(&mut g.tag_ids, tag_id))
            .filter(|removed| *removed)
            .count();

        debug!(
            "Tag '{}' ({tag_id}) deleted, purged from {assets_touched} asset(s) \
             and {groups_touched} group(s)",
            removed.name
        );
        Ok(removed)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn asset_mut<'a>(
        portfolio: &'a mut Portfolio,
        asset_id: &str,
    ) -> Result<&'a mut Asset, CoreError> {
        portfolio
            .assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Asset, asset_id))
    }

    fn group_mut<'a>(
        portfolio: &'a mut Portfolio,
        group_id: &str,
    ) -> Result<&'a mut Group, CoreError> {
        portfolio
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Group, group_id))
    }

    fn group_index(portfolio: &Portfolio, group_id: &str) -> Result<usize, CoreError> {
        portfolio
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Group, group_id))
    }

    fn ensure_tag(portfolio: &Portfolio, tag_id: &str) -> Result<(), CoreError> {
        portfolio
            .tag(tag_id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found(EntityKind::Tag, tag_id))
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str, what: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(format!(
            "{what} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
