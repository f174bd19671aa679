use serde::{Deserialize, Serialize};

/// Derived view model. Recomputed from scratch from the portfolio; never
/// edited in place.
///
/// All values are full precision. Rounding belongs to whoever displays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculated {
    /// Cash reserve converted to the base currency.
    pub total_cash: f64,

    /// Sum of every asset's value, regardless of grouping.
    pub total_invested: f64,

    /// Planned total with the division guard applied (>= 1).
    pub planned_total: f64,

    /// total_invested + total_cash
    pub total_assets: f64,

    /// total_invested / planned_total * 100
    pub position_percent: f64,

    /// One entry per group, in group order.
    pub group_metrics: Vec<GroupMetrics>,

    /// One entry per tag, largest value first.
    pub tag_metrics: Vec<TagMetrics>,

    /// One entry per asset, in asset order.
    pub asset_metrics: Vec<AssetMetrics>,
}

impl Calculated {
    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&GroupMetrics> {
        self.group_metrics.iter().find(|m| m.group_id == group_id)
    }

    #[must_use]
    pub fn tag(&self, tag_id: &str) -> Option<&TagMetrics> {
        self.tag_metrics.iter().find(|m| m.tag_id == tag_id)
    }

    #[must_use]
    pub fn asset(&self, asset_id: &str) -> Option<&AssetMetrics> {
        self.asset_metrics.iter().find(|m| m.asset_id == asset_id)
    }
}

/// Allocation progress of a single group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    pub group_id: String,

    /// Effective members, as decided by the group's view type.
    pub member_ids: Vec<String>,

    /// Sum of member values.
    pub current: f64,

    /// planned_total * target_percent / 100
    pub target: f64,

    /// target - current. Positive means underweight (buy), negative overweight (trim).
    pub gap: f64,

    /// current / target * 100, or 0 when the target is 0.
    pub completion: f64,
}

impl GroupMetrics {
    #[must_use]
    pub fn is_underweight(&self) -> bool {
        self.gap > 0.0
    }
}

/// Exposure to a single tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagMetrics {
    pub tag_id: String,
    pub name: String,
    pub color: String,

    /// Sum of values of every asset carrying the tag.
    pub value: f64,

    /// value / planned_total * 100
    pub percent: f64,

    pub asset_count: usize,
}

/// Position of a single asset against its own target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetrics {
    pub asset_id: String,
    pub value: f64,

    /// planned_total * target_percent / 100
    pub target: f64,

    /// target - value
    pub gap: f64,

    /// value / planned_total * 100
    pub percent: f64,
}
