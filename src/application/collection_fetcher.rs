// Collection fetcher - Loads the four source collections side by side
use crate::application::parking_repository::{
    CollectionKind, FetchError, ParkingRepository, StatisticsPayload,
};
use crate::domain::financial::EstimateMode;
use crate::domain::records::{OccupancySnapshot, ParkingSpot, Reservation, User};
use std::sync::Arc;
use std::time::Instant;

pub type Outcome<T> = Result<Vec<T>, FetchError>;

/// Per-kind results of one `load_all` round. A failure in one kind never
/// affects the others.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub users: Outcome<User>,
    pub reservations: Outcome<Reservation>,
    pub parking_spots: Outcome<ParkingSpot>,
    pub occupancy: Outcome<OccupancySnapshot>,
}

impl FetchResult {
    pub fn failures(&self) -> Vec<(CollectionKind, &FetchError)> {
        let mut failures = Vec::new();
        if let Err(e) = &self.users {
            failures.push((CollectionKind::Users, e));
        }
        if let Err(e) = &self.reservations {
            failures.push((CollectionKind::Reservations, e));
        }
        if let Err(e) = &self.parking_spots {
            failures.push((CollectionKind::ParkingSpots, e));
        }
        if let Err(e) = &self.occupancy {
            failures.push((CollectionKind::Occupancy, e));
        }
        failures
    }

    pub fn all_failed(&self) -> bool {
        self.failures().len() == 4
    }
}

#[derive(Clone)]
pub struct CollectionFetcher {
    repository: Arc<dyn ParkingRepository>,
}

impl CollectionFetcher {
    pub fn new(repository: Arc<dyn ParkingRepository>) -> Self {
        Self { repository }
    }

    /// Issue all four collection requests concurrently and wait for every
    /// one of them to settle.
    pub async fn load_all(&self) -> FetchResult {
        let started = Instant::now();

        let (users, reservations, parking_spots, occupancy) = tokio::join!(
            self.repository.fetch_users(),
            self.repository.fetch_reservations(),
            self.repository.fetch_parking_spots(),
            self.repository.fetch_occupancy(),
        );

        let result = FetchResult {
            users,
            reservations,
            parking_spots,
            occupancy,
        };

        for (kind, err) in result.failures() {
            tracing::warn!("Failed to load {}: {}", kind, err);
        }
        tracing::debug!(
            "Loaded collections in {}ms ({} failed)",
            started.elapsed().as_millis(),
            result.failures().len()
        );

        result
    }

    pub async fn load_users(&self) -> Outcome<User> {
        self.repository.fetch_users().await
    }

    pub async fn load_reservations(&self) -> Outcome<Reservation> {
        self.repository.fetch_reservations().await
    }

    pub async fn load_statistics(&self, mode: EstimateMode) -> Result<StatisticsPayload, FetchError> {
        self.repository.fetch_statistics(mode).await
    }
}
