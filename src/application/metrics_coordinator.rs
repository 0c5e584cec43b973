// Metrics coordinator - Decides between cache reuse and refresh, and holds
// the counters for the currently selected window
use crate::application::collection_fetcher::CollectionFetcher;
use crate::application::session_cache::{CacheEntry, STALE_AFTER, SessionCache};
use crate::application::window_filter::derive_metrics;
use crate::domain::metrics::DerivedMetrics;
use crate::domain::window::TimeWindow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Refreshing,
    Ready,
    Failed,
}

/// What the dashboard renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
    pub metrics: DerivedMetrics,
    pub loading: bool,
    pub error: Option<String>,
    pub time_window: TimeWindow,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub stale: bool,
    pub phase: Phase,
}

#[derive(Debug)]
struct CoordinatorState {
    phase: Phase,
    window: TimeWindow,
    error: Option<String>,
    metrics: DerivedMetrics,
}

#[derive(Clone)]
pub struct MetricsCoordinator {
    fetcher: CollectionFetcher,
    cache: SessionCache,
    state: Arc<RwLock<CoordinatorState>>,
    // Held for the duration of a refresh round; see `run_refresh`.
    refresh_gate: Arc<Mutex<()>>,
    torn_down: Arc<AtomicBool>,
}

impl MetricsCoordinator {
    pub fn new(fetcher: CollectionFetcher, cache: SessionCache) -> Self {
        Self {
            fetcher,
            cache,
            state: Arc::new(RwLock::new(CoordinatorState {
                phase: Phase::Idle,
                window: TimeWindow::default(),
                error: None,
                metrics: DerivedMetrics::loading(),
            })),
            refresh_gate: Arc::new(Mutex::new(())),
            torn_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn view(&self) -> MetricsView {
        let entry = self.cache.get().await;
        let state = self.state.read().await;
        MetricsView {
            metrics: state.metrics.clone(),
            loading: state.phase == Phase::Refreshing,
            error: state.error.clone(),
            time_window: state.window,
            last_fetched_at: entry.last_fetched_at,
            stale: entry.is_stale_at(Utc::now(), STALE_AFTER),
            phase: state.phase,
        }
    }

    /// First activation: refresh once, then just report.
    pub async fn activate(&self) -> MetricsView {
        if self.state.read().await.phase == Phase::Idle {
            return self.refetch().await;
        }
        self.view().await
    }

    /// Switch the window and re-derive from whatever is cached. Never
    /// fetches, however old the cache is.
    pub async fn set_time_window(&self, window: TimeWindow) -> MetricsView {
        let entry = self.cache.get().await;
        {
            let mut state = self.state.write().await;
            state.window = window;
            if state.phase != Phase::Failed {
                state.metrics = derive_metrics(&entry, window, Utc::now());
            }
        }
        self.view().await
    }

    /// Refresh if the cache is stale (or holds failed collections), otherwise
    /// re-derive from it.
    pub async fn refetch(&self) -> MetricsView {
        self.run_refresh(false).await
    }

    /// Refresh regardless of the cache's age. The cache is only cleared
    /// once the round's result is accepted.
    pub async fn force_refresh(&self) -> MetricsView {
        self.run_refresh(true).await
    }

    /// Mark the consumer as gone. Rounds still in flight finish but their
    /// results are thrown away.
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    async fn run_refresh(&self, force: bool) -> MetricsView {
        // A request arriving mid-round is not queued: it waits for the
        // round in flight and reports its outcome.
        let Ok(_round) = self.refresh_gate.try_lock() else {
            tracing::debug!("Refresh already in flight, joining it");
            let _ = self.refresh_gate.lock().await;
            return self.view().await;
        };

        let previous_phase = {
            let mut state = self.state.write().await;
            let previous = state.phase;
            if previous == Phase::Idle {
                state.metrics = DerivedMetrics::loading();
            }
            state.phase = Phase::Refreshing;
            previous
        };

        // Only this path writes the cache, and it holds the gate, so both
        // checks see the same entry.
        let stale = self.cache.is_stale(STALE_AFTER).await;
        if force || stale || self.cache.get().await.has_failures() {
            tracing::info!("Refreshing dashboard collections");
            let result = self.fetcher.load_all().await;

            if self.is_torn_down() {
                tracing::info!("Discarding refresh result after teardown");
                self.state.write().await.phase = previous_phase;
                return self.view().await;
            }

            // A forced round drops the old entry even when nothing new loads.
            if force {
                self.cache.invalidate().await;
            }

            if result.all_failed() {
                let message = format!(
                    "all collections failed to load: {}",
                    result
                        .failures()
                        .iter()
                        .map(|(kind, err)| format!("{kind}: {err}"))
                        .collect::<Vec<_>>()
                        .join("; ")
                );
                tracing::error!("{}", message);

                let mut state = self.state.write().await;
                state.phase = Phase::Failed;
                state.metrics = DerivedMetrics::failed(&message);
                state.error = Some(message);
                drop(state);
                return self.view().await;
            }

            self.cache
                .put(CacheEntry::from_fetch(result, Utc::now()))
                .await;
        } else {
            tracing::debug!("Cache is fresh, skipping fetch");
        }

        let entry = self.cache.get().await;
        {
            let mut state = self.state.write().await;
            state.metrics = derive_metrics(&entry, state.window, Utc::now());
            state.phase = Phase::Ready;
            state.error = None;
            let errored = state.metrics.errored_counters();
            if errored > 0 {
                tracing::warn!("{} dashboard counters could not be derived", errored);
            }
        }
        self.view().await
    }
}
