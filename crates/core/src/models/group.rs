use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a group decides which assets belong to it.
///
/// Also used as the active display filter of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Membership is the explicit `asset_ids` list.
    Structural,
    /// Membership is computed from tag overlap with `tag_ids`.
    #[default]
    Attribution,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Structural => write!(f, "structural"),
            ViewMode::Attribution => write!(f, "attribution"),
        }
    }
}

/// A target-allocation bucket.
///
/// Only one of `asset_ids` / `tag_ids` is authoritative, depending on
/// `view_type`; the other is carried but ignored by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_percent: f64,
    #[serde(default)]
    pub asset_ids: Vec<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub theme_color: String,
    /// Fixed at creation.
    pub view_type: ViewMode,
}

impl Group {
    pub fn new(
        name: impl Into<String>,
        view_type: ViewMode,
        theme_color: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("group-{}", Uuid::new_v4()),
            name: name.into(),
            description: String::new(),
            target_percent: 0.0,
            asset_ids: Vec::new(),
            tag_ids: Vec::new(),
            theme_color: theme_color.into(),
            view_type,
        }
    }

    #[must_use]
    pub fn is_attribution(&self) -> bool {
        self.view_type == ViewMode::Attribution
    }

    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.view_type == ViewMode::Structural
    }
}
