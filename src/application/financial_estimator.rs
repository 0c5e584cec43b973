// Financial estimator - Statistics endpoint first, estimate from raw
// collections when it is unavailable
use crate::application::collection_fetcher::CollectionFetcher;
use crate::application::parking_repository::{FetchError, StatisticsPayload};
use crate::application::session_cache::{STALE_AFTER, SessionCache};
use crate::application::window_filter::reservations_in_window;
use crate::domain::financial::{EstimateMode, EstimateSource, FinancialEstimate, percent_change};
use crate::domain::records::{Reservation, User};
use crate::domain::window::TimeWindow;
use crate::infrastructure::config::EstimatorConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("statistics unavailable ({primary}) and fallback estimate failed ({fallback})")]
    Unavailable {
        primary: FetchError,
        fallback: FetchError,
    },

    #[error("estimate cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateView {
    pub mode: EstimateMode,
    pub estimate: Option<FinancialEstimate>,
    pub loading: bool,
    pub error: Option<String>,
}

impl EstimateView {
    fn empty(mode: EstimateMode) -> Self {
        Self {
            mode,
            estimate: None,
            loading: false,
            error: None,
        }
    }

    /// Nothing requested yet for this mode.
    pub fn is_pristine(&self) -> bool {
        self.estimate.is_none() && self.error.is_none() && !self.loading
    }
}

struct ModeSlot {
    view: RwLock<EstimateView>,
    gate: Mutex<()>,
}

impl ModeSlot {
    fn new(mode: EstimateMode) -> Self {
        Self {
            view: RwLock::new(EstimateView::empty(mode)),
            gate: Mutex::new(()),
        }
    }
}

#[derive(Clone)]
pub struct FinancialEstimator {
    fetcher: CollectionFetcher,
    cache: SessionCache,
    settings: EstimatorConfig,
    admin: Arc<ModeSlot>,
    user: Arc<ModeSlot>,
    torn_down: Arc<AtomicBool>,
}

impl FinancialEstimator {
    pub fn new(fetcher: CollectionFetcher, cache: SessionCache, settings: EstimatorConfig) -> Self {
        Self {
            fetcher,
            cache,
            settings,
            admin: Arc::new(ModeSlot::new(EstimateMode::Admin)),
            user: Arc::new(ModeSlot::new(EstimateMode::User)),
            torn_down: Arc::new(AtomicBool::new(false)),
        }
    }

    fn slot(&self, mode: EstimateMode) -> &ModeSlot {
        match mode {
            EstimateMode::Admin => &self.admin,
            EstimateMode::User => &self.user,
        }
    }

    pub async fn view(&self, mode: EstimateMode) -> EstimateView {
        self.slot(mode).view.read().await.clone()
    }

    /// Recompute the estimate for `mode`. Requests made while one is in
    /// flight share its outcome.
    pub async fn refetch(&self, mode: EstimateMode) -> EstimateView {
        let slot = self.slot(mode);
        let Ok(_round) = slot.gate.try_lock() else {
            let _ = slot.gate.lock().await;
            return self.view(mode).await;
        };

        slot.view.write().await.loading = true;
        let outcome = self.estimate(mode).await;

        let mut view = slot.view.write().await;
        view.loading = false;
        if self.torn_down.load(Ordering::SeqCst) {
            return view.clone();
        }

        match outcome {
            Ok(estimate) => {
                view.estimate = Some(estimate);
                view.error = None;
            }
            Err(e) => {
                view.estimate = None;
                view.error = Some(e.to_string());
            }
        }
        view.clone()
    }

    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    pub async fn estimate(&self, mode: EstimateMode) -> Result<FinancialEstimate, EstimatorError> {
        let primary = match self.fetcher.load_statistics(mode).await {
            Ok(stats) => return Ok(self.from_statistics(stats)),
            Err(e) => e,
        };

        if self.torn_down.load(Ordering::SeqCst) {
            return Err(EstimatorError::Cancelled);
        }

        tracing::warn!(
            "Statistics endpoint unavailable for {:?} ({}), estimating from collections",
            mode,
            primary
        );

        self.fallback(mode, Utc::now())
            .await
            .map_err(|fallback| {
                tracing::error!("Fallback estimate failed for {:?}: {}", mode, fallback);
                EstimatorError::Unavailable { primary, fallback }
            })
    }

    fn from_statistics(&self, stats: StatisticsPayload) -> FinancialEstimate {
        FinancialEstimate {
            gross_revenue: stats.gross_revenue,
            commissions_paid: stats.commissions_paid,
            percent_change_revenue: stats.percent_change_revenue,
            percent_change_commissions: stats.percent_change_commissions,
            currency_code: stats
                .currency_code
                .unwrap_or_else(|| self.settings.currency_code.clone()),
            source: EstimateSource::Statistics,
            reservation_count: stats.reservation_count,
            user_count: None,
        }
    }

    /// Uses the session cache when it is fresh, otherwise fetches the needed
    /// collections directly. Never writes the cache.
    async fn fallback(
        &self,
        mode: EstimateMode,
        now: DateTime<Utc>,
    ) -> Result<FinancialEstimate, FetchError> {
        let entry = self.cache.get().await;
        let fresh = !entry.is_stale_at(now, STALE_AFTER);

        let cached_reservations = entry.reservations.loaded().filter(|_| fresh);
        let cached_users = match mode {
            EstimateMode::User => None,
            EstimateMode::Admin => entry.users.loaded().filter(|_| fresh),
        };
        let needs_users = mode == EstimateMode::Admin && cached_users.is_none();

        // Whatever the cache can't supply is fetched concurrently.
        let (fetched_reservations, fetched_users) = tokio::join!(
            async {
                match cached_reservations {
                    Some(_) => Ok(Vec::new()),
                    None => self.fetcher.load_reservations().await,
                }
            },
            async {
                if needs_users {
                    self.fetcher.load_users().await.map(Some)
                } else {
                    Ok(None)
                }
            }
        );
        let fetched_reservations: Vec<Reservation> = fetched_reservations?;
        let fetched_users: Option<Vec<User>> = fetched_users?;

        let reservations = cached_reservations.unwrap_or(fetched_reservations.as_slice());
        let user_count = match mode {
            EstimateMode::User => None,
            EstimateMode::Admin => Some(
                cached_users
                    .map(<[User]>::len)
                    .or_else(|| fetched_users.as_ref().map(Vec::len))
                    .unwrap_or_default() as u64,
            ),
        };

        Ok(self.estimate_from_reservations(reservations, user_count, now))
    }

    /// `gross = count × average`, `commissions = gross × rate`. The trend
    /// compares the trailing 30 days with the 30 days before them.
    fn estimate_from_reservations(
        &self,
        reservations: &[Reservation],
        user_count: Option<u64>,
        now: DateTime<Utc>,
    ) -> FinancialEstimate {
        let average = self.settings.average_revenue_per_reservation;
        let rate = self.settings.commission_rate;

        let gross_revenue = reservations.len() as f64 * average;
        let commissions_paid = gross_revenue * rate;

        let period = TimeWindow::Month;
        let current = reservations_in_window(reservations, period, now).len();
        let previous = reservations_in_window(reservations, period, now - period.lookback())
            .iter()
            .filter(|r| {
                r.effective_date()
                    .is_some_and(|date| date < now - period.lookback())
            })
            .count();

        let revenue_change = percent_change(previous as f64 * average, current as f64 * average);
        let commission_change = percent_change(
            previous as f64 * average * rate,
            current as f64 * average * rate,
        );

        FinancialEstimate {
            gross_revenue,
            commissions_paid,
            percent_change_revenue: revenue_change,
            percent_change_commissions: commission_change,
            currency_code: self.settings.currency_code.clone(),
            source: EstimateSource::Fallback,
            reservation_count: Some(reservations.len() as u64),
            user_count,
        }
    }
}
