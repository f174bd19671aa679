use crate::models::asset::Asset;
use crate::models::metrics::{AssetMetrics, Calculated, GroupMetrics, TagMetrics};
use crate::models::portfolio::Portfolio;
use crate::services::attribution_service::AttributionService;

/// Turns a portfolio into its display metrics.
///
/// Pure and deterministic: the same portfolio always yields the same
/// `Calculated`. No rounding happens here.
pub struct DerivationService {
    attribution_service: AttributionService,
}

impl DerivationService {
    pub fn new() -> Self {
        Self {
            attribution_service: AttributionService::new(),
        }
    }

    /// Compute the full view model.
    ///
    /// Computes:
    /// - Cash reserve in the base currency
    /// - Total invested and position ratio against the planned total
    /// - Per-group current / target / gap / completion
    /// - Per-tag exposure, largest first
    /// - Per-asset position against its own target
    pub fn calculate(&self, portfolio: &Portfolio) -> Calculated {
        let settings = &portfolio.settings;

        let total_cash = bounded(
            bounded(settings.cash_usd * settings.usd_rate)
                + bounded(settings.cash_jpy * settings.jpy_rate),
        );
        let total_invested = sum_values(portfolio.assets.iter());
        let planned_total = settings.effective_planned_total();
        let total_assets = bounded(total_invested + total_cash);
        let position_percent = ratio_percent(total_invested, planned_total);

        // 1. Groups
        let group_metrics = portfolio
            .groups
            .iter()
            .map(|group| {
                let members = self.attribution_service.members(group, &portfolio.assets);
                let current = sum_values(members.iter().copied());
                let target = bounded(planned_total * group.target_percent / 100.0);
                let gap = bounded(target - current);
                let completion = if target > 0.0 {
                    ratio_percent(current, target)
                } else {
                    0.0
                };

                GroupMetrics {
                    group_id: group.id.clone(),
                    member_ids: members.iter().map(|a| a.id.clone()).collect(),
                    current,
                    target,
                    gap,
                    completion,
                }
            })
            .collect();

        // 2. Tags
        let mut tag_metrics: Vec<TagMetrics> = portfolio
            .tags
            .iter()
            .map(|tag| {
                let tagged: Vec<&Asset> = portfolio
                    .assets
                    .iter()
                    .filter(|a| a.has_tag(&tag.id))
                    .collect();
                let value = sum_values(tagged.iter().copied());
                let asset_count = tagged.len();

                TagMetrics {
                    tag_id: tag.id.clone(),
                    name: tag.name.clone(),
                    color: tag.color.clone(),
                    value,
                    percent: ratio_percent(value, planned_total),
                    asset_count,
                }
            })
            .collect();

        // Largest exposure first; `sort_by` is stable, so ties keep tag order.
        tag_metrics.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // 3. Assets
        let asset_metrics = portfolio
            .assets
            .iter()
            .map(|asset| {
                let value = finite(asset.value);
                let target = bounded(planned_total * asset.target_percent / 100.0);
                AssetMetrics {
                    asset_id: asset.id.clone(),
                    value,
                    target,
                    gap: bounded(target - value),
                    percent: ratio_percent(value, planned_total),
                }
            })
            .collect();

        Calculated {
            total_cash,
            total_invested,
            planned_total,
            total_assets,
            position_percent,
            group_metrics,
            tag_metrics,
            asset_metrics,
        }
    }
}

impl Default for DerivationService {
    fn default() -> Self {
        Self::new()
    }
}

/// `part / whole * 100`, 0 for a non-positive whole. Never NaN or infinite.
fn ratio_percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        bounded(part / whole * 100.0)
    } else {
        0.0
    }
}

/// Sum of asset values; saturates at `f64::MAX` instead of overflowing.
fn sum_values<'a>(assets: impl Iterator<Item = &'a Asset>) -> f64 {
    assets.fold(0.0, |sum, a| bounded(sum + finite(a.value)))
}

/// Arithmetic result clamped into the finite range. NaN becomes 0.
fn bounded(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-f64::MAX, f64::MAX)
    }
}

/// Raw input value, 0 if it is not a finite number.
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
