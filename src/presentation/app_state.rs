// Application state for HTTP handlers
use crate::application::financial_estimator::FinancialEstimator;
use crate::application::metrics_coordinator::MetricsCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: MetricsCoordinator,
    pub estimator: FinancialEstimator,
}
