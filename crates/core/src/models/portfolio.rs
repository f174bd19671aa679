use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::asset::Asset;
use super::defaults;
use super::group::{Group, ViewMode};
use super::settings::GlobalSettings;
use super::tag::{dedup_ids, Tag};

/// The main data container: settings, assets, groups, tags and the active
/// view. This is exactly what gets persisted as the snapshot.
///
/// Serialized shape: `{settings, assets, groups, tags, activeView}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub settings: GlobalSettings,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub active_view: ViewMode,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            settings: defaults::initial_settings(),
            assets: defaults::initial_assets(),
            groups: defaults::initial_groups(),
            tags: defaults::initial_tags(),
            active_view: ViewMode::Attribution,
        }
    }
}

impl Portfolio {
    /// A portfolio with the given settings and no assets, groups or tags.
    pub fn empty(settings: GlobalSettings) -> Self {
        Self {
            settings,
            assets: Vec::new(),
            groups: Vec::new(),
            tags: Vec::new(),
            active_view: ViewMode::Attribution,
        }
    }

    #[must_use]
    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Names of the asset's tags, in the asset's tag order.
    #[must_use]
    pub fn tag_names(&self, asset: &Asset) -> Vec<&str> {
        asset
            .tag_ids
            .iter()
            .filter_map(|id| self.tag(id).map(|t| t.name.as_str()))
            .collect()
    }

    /// Bring a loaded snapshot back in line with the integrity invariants:
    /// every referenced tag/asset id exists, id sets hold no duplicates,
    /// amounts are finite and non-negative, percents are within 0..=100.
    ///
    /// Returns the number of individual fixes applied.
    pub fn repair(&mut self) -> usize {
        let mut fixes = 0;

        let tag_ids: HashSet<String> = self.tags.iter().map(|t| t.id.clone()).collect();
        let asset_ids: HashSet<String> = self.assets.iter().map(|a| a.id.clone()).collect();

        for asset in &mut self.assets {
            fixes += retain_known(&mut asset.tag_ids, &tag_ids);
            fixes += sanitize_amount(&mut asset.value);
            fixes += sanitize_percent(&mut asset.target_percent);
        }

        for group in &mut self.groups {
            fixes += retain_known(&mut group.tag_ids, &tag_ids);
            fixes += retain_known(&mut group.asset_ids, &asset_ids);
            fixes += sanitize_percent(&mut group.target_percent);
        }

        let s = &mut self.settings;
        for slot in [
            &mut s.planned_total,
            &mut s.a_share_pool,
            &mut s.global_pool,
            &mut s.cash_usd,
            &mut s.cash_jpy,
            &mut s.usd_rate,
            &mut s.jpy_rate,
        ] {
            fixes += sanitize_amount(slot);
        }

        if fixes > 0 {
            warn!("Repaired {fixes} integrity issue(s) in loaded portfolio");
        }
        fixes
    }
}

fn retain_known(ids: &mut Vec<String>, known: &HashSet<String>) -> usize {
    let before = ids.len();
    let kept = dedup_ids(std::mem::take(ids))
        .into_iter()
        .filter(|id| known.contains(id))
        .collect();
    *ids = kept;
    before - ids.len()
}

fn sanitize_amount(value: &mut f64) -> usize {
    if value.is_finite() && *value >= 0.0 {
        0
    } else {
        *value = 0.0;
        1
    }
}

fn sanitize_percent(value: &mut f64) -> usize {
    let clamped = if value.is_finite() { value.clamp(0.0, 100.0) } else { 0.0 };
    if clamped == *value {
        0
    } else {
        *value = clamped;
        1
    }
}
