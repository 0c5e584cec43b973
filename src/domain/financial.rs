// Monetary aggregates shown on the earnings panels
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateMode {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    /// Figures returned by the statistics endpoint.
    Statistics,
    /// Figures recomputed from raw collections with the configured constants.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEstimate {
    pub gross_revenue: f64,
    pub commissions_paid: f64,
    pub percent_change_revenue: f64,
    pub percent_change_commissions: f64,
    pub currency_code: String,
    pub source: EstimateSource,
    pub reservation_count: Option<u64>,
    pub user_count: Option<u64>,
}

/// Percentage change from `previous` to `current`; zero when there is no
/// earlier figure to compare against.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}
