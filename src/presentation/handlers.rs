// HTTP request handlers
use crate::application::financial_estimator::EstimateView;
use crate::application::metrics_coordinator::MetricsView;
use crate::domain::financial::EstimateMode;
use crate::domain::window::TimeWindow;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct WindowQuery {
    pub window: Option<TimeWindow>,
}

#[derive(Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Deserialize)]
pub struct ModeQuery {
    pub mode: Option<EstimateMode>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current counters, optionally switching the window first. Never fetches.
pub async fn get_metrics(
    Query(query): Query<WindowQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<MetricsView> {
    let view = match query.window {
        Some(window) => state.coordinator.set_time_window(window).await,
        None => state.coordinator.view().await,
    };
    Json(view)
}

pub async fn refresh_metrics(
    Query(query): Query<RefreshQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<MetricsView> {
    let view = if query.force {
        state.coordinator.force_refresh().await
    } else {
        state.coordinator.refetch().await
    };
    Json(view)
}

/// Current estimate for the mode, computed on first access.
pub async fn get_financials(
    Query(query): Query<ModeQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<EstimateView> {
    let mode = query.mode.unwrap_or(EstimateMode::Admin);
    let view = state.estimator.view(mode).await;
    if view.is_pristine() {
        return Json(state.estimator.refetch(mode).await);
    }
    Json(view)
}

pub async fn refresh_financials(
    Query(query): Query<ModeQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<EstimateView> {
    let mode = query.mode.unwrap_or(EstimateMode::Admin);
    Json(state.estimator.refetch(mode).await)
}
