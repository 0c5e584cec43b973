// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_financials, get_metrics, health_check, refresh_financials, refresh_metrics,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/metrics/refresh", post(refresh_metrics))
        .route("/financials", get(get_financials))
        .route("/financials/refresh", post(refresh_financials))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
