use std::collections::{HashMap, HashSet};

use crate::models::asset::Asset;
use crate::models::group::{Group, ViewMode};

/// Decides which assets belong to a group.
///
/// - Attribution groups are views over tags: an asset is a member when it
///   shares at least one tag with the group. Membership is recomputed on
///   every call and is not exclusive, so one asset may count towards
///   several attribution groups.
/// - Structural groups use their explicit `asset_ids` list, in list order.
///   Tags play no role.
pub struct AttributionService;

impl AttributionService {
    pub fn new() -> Self {
        Self
    }

    /// Effective member list of `group`, drawn from `assets`.
    pub fn members<'a>(&self, group: &Group, assets: &'a [Asset]) -> Vec<&'a Asset> {
        match group.view_type {
            ViewMode::Attribution => Self::members_by_tags(group, assets),
            ViewMode::Structural => Self::members_by_list(group, assets),
        }
    }

    /// Ids of `members`, convenient for change detection and display.
    pub fn member_ids(&self, group: &Group, assets: &[Asset]) -> Vec<String> {
        self.members(group, assets)
            .into_iter()
            .map(|a| a.id.clone())
            .collect()
    }

    fn members_by_tags<'a>(group: &Group, assets: &'a [Asset]) -> Vec<&'a Asset> {
        if group.tag_ids.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<&str> = group.tag_ids.iter().map(String::as_str).collect();
        assets
            .iter()
            .filter(|a| a.tag_ids.iter().any(|t| wanted.contains(t.as_str())))
            .collect()
    }

    fn members_by_list<'a>(group: &Group, assets: &'a [Asset]) -> Vec<&'a Asset> {
        let by_id: HashMap<&str, &Asset> = assets.iter().map(|a| (a.id.as_str(), a)).collect();
        let mut seen = HashSet::new();
        group
            .asset_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect()
    }
}

impl Default for AttributionService {
    fn default() -> Self {
        Self::new()
    }
}
