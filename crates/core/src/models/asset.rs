use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single position in the portfolio.
///
/// `value` is the current market value in the base currency (always >= 0).
/// `target_percent` is the asset's target share of the planned total (0..=100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub target_percent: f64,
    /// Tag ids, with set semantics (no duplicates, insertion order kept).
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl Asset {
    /// A fresh, empty asset: zero value, zero target, no tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: format!("asset-{}", Uuid::new_v4()),
            name: name.into(),
            value: 0.0,
            target_percent: 0.0,
            tag_ids: Vec::new(),
        }
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            target_percent: 0.0,
            tag_ids: Vec::new(),
        }
    }

    /// Builder-style helpers, mostly for seeding data and tests.
    pub fn target(mut self, target_percent: f64) -> Self {
        self.target_percent = target_percent;
        self
    }

    pub fn tagged<I, S>(mut self, tag_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in tag_ids {
            let id = id.into();
            super::tag::insert_id(&mut self.tag_ids, &id);
        }
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|t| t == tag_id)
    }
}
