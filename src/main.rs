// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::collection_fetcher::CollectionFetcher;
use crate::application::financial_estimator::FinancialEstimator;
use crate::application::metrics_coordinator::MetricsCoordinator;
use crate::application::session_cache::SessionCache;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::credentials::EnvCredentialProvider;
use crate::infrastructure::http_repository::HttpParkingRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let credentials = Arc::new(EnvCredentialProvider::new(config.auth.token_env.clone()));
    let repository = Arc::new(HttpParkingRepository::new(config.api.clone(), credentials)?);

    // One cache for the whole session, shared by both consumers
    let cache = SessionCache::new();
    let fetcher = CollectionFetcher::new(repository);
    let coordinator = MetricsCoordinator::new(fetcher.clone(), cache.clone());
    let estimator = FinancialEstimator::new(fetcher, cache, config.estimator.clone());

    // Warm the cache before the first dashboard request arrives
    let warmup = coordinator.clone();
    tokio::spawn(async move {
        let view = warmup.activate().await;
        tracing::info!(
            "Initial metrics load finished in phase {:?} ({:?} users, {:?} spots)",
            view.phase,
            view.metrics.total_users.value(),
            view.metrics.total_parking_spots.value()
        );
    });

    let state = Arc::new(AppState {
        coordinator: coordinator.clone(),
        estimator: estimator.clone(),
    });
    let router = build_router(state);

    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;
    tracing::info!("Starting parking-metrics service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
            coordinator.teardown();
            estimator.teardown();
        })
        .await?;

    Ok(())
}
