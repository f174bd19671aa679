use serde::{Deserialize, Serialize};

/// Portfolio-wide numbers entered by the user.
///
/// All amounts are in the base currency except the two cash balances,
/// which are converted with the fixed `usd_rate` / `jpy_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Denominator for every percent-to-currency conversion.
    #[serde(default)]
    pub planned_total: f64,
    #[serde(rename = "aSharePool", default)]
    pub a_share_pool: f64,
    #[serde(default)]
    pub global_pool: f64,
    #[serde(rename = "cashUSD", default)]
    pub cash_usd: f64,
    #[serde(rename = "cashJPY", default)]
    pub cash_jpy: f64,
    #[serde(default)]
    pub usd_rate: f64,
    #[serde(default)]
    pub jpy_rate: f64,
}

impl GlobalSettings {
    /// Planned total with the division guard applied: never below 1.
    #[must_use]
    pub fn effective_planned_total(&self) -> f64 {
        if self.planned_total.is_finite() {
            self.planned_total.max(1.0)
        } else {
            1.0
        }
    }

    /// Shallow merge: every `Some` field in the patch overwrites the current value.
    /// Negative or non-finite inputs are stored as 0, the same rule
    /// `Portfolio::repair` applies on load.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        fn merge(slot: &mut f64, value: Option<f64>) {
            if let Some(v) = value {
                *slot = if v.is_finite() && v >= 0.0 { v } else { 0.0 };
            }
        }

        merge(&mut self.planned_total, patch.planned_total);
        merge(&mut self.a_share_pool, patch.a_share_pool);
        merge(&mut self.global_pool, patch.global_pool);
        merge(&mut self.cash_usd, patch.cash_usd);
        merge(&mut self.cash_jpy, patch.cash_jpy);
        merge(&mut self.usd_rate, patch.usd_rate);
        merge(&mut self.jpy_rate, patch.jpy_rate);
    }
}

impl Default for GlobalSettings {
    fn default() -> Self {
        super::defaults::initial_settings()
    }
}

/// Partial update for `GlobalSettings`. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub planned_total: Option<f64>,
    pub a_share_pool: Option<f64>,
    pub global_pool: Option<f64>,
    pub cash_usd: Option<f64>,
    pub cash_jpy: Option<f64>,
    pub usd_rate: Option<f64>,
    pub jpy_rate: Option<f64>,
}

impl SettingsPatch {
    pub fn planned_total(mut self, v: f64) -> Self {
        self.planned_total = Some(v);
        self
    }

    pub fn cash_usd(mut self, v: f64) -> Self {
        self.cash_usd = Some(v);
        self
    }

    pub fn cash_jpy(mut self, v: f64) -> Self {
        self.cash_jpy = Some(v);
        self
    }

    pub fn usd_rate(mut self, v: f64) -> Self {
        self.usd_rate = Some(v);
        self
    }

    pub fn jpy_rate(mut self, v: f64) -> Self {
        self.jpy_rate = Some(v);
        self
    }

    pub fn a_share_pool(mut self, v: f64) -> Self {
        self.a_share_pool = Some(v);
        self
    }

    pub fn global_pool(mut self, v: f64) -> Self {
        self.global_pool = Some(v);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
