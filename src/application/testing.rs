// In-memory repository and record builders shared by the unit tests
use crate::application::parking_repository::{FetchError, ParkingRepository, StatisticsPayload};
use crate::domain::financial::EstimateMode;
use crate::domain::records::{OccupancySnapshot, ParkingSpot, Reservation, ReservationStatus, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct CallCounts {
    pub users: AtomicUsize,
    pub reservations: AtomicUsize,
    pub parking_spots: AtomicUsize,
    pub occupancy: AtomicUsize,
    pub statistics: AtomicUsize,
    in_flight: AtomicUsize,
    /// Most requests that were outstanding at the same time.
    pub peak_in_flight: AtomicUsize,
}

impl CallCounts {
    pub fn collection_calls(&self) -> usize {
        self.users.load(Ordering::SeqCst)
            + self.reservations.load(Ordering::SeqCst)
            + self.parking_spots.load(Ordering::SeqCst)
            + self.occupancy.load(Ordering::SeqCst)
    }

    async fn record<T: Clone>(&self, counter: &AtomicUsize, answer: &T) -> T {
        counter.fetch_add(1, Ordering::SeqCst);
        let outstanding = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(outstanding, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        answer.clone()
    }
}

pub struct FakeRepository {
    pub users: Result<Vec<User>, FetchError>,
    pub reservations: Result<Vec<Reservation>, FetchError>,
    pub parking_spots: Result<Vec<ParkingSpot>, FetchError>,
    pub occupancy: Result<Vec<OccupancySnapshot>, FetchError>,
    pub statistics: Result<StatisticsPayload, FetchError>,
    pub calls: CallCounts,
}

impl FakeRepository {
    /// Every collection loads empty; the statistics endpoint answers 500.
    pub fn empty() -> Self {
        Self {
            users: Ok(Vec::new()),
            reservations: Ok(Vec::new()),
            parking_spots: Ok(Vec::new()),
            occupancy: Ok(Vec::new()),
            statistics: Err(FetchError::Status { status: 500 }),
            calls: CallCounts::default(),
        }
    }

    pub fn all_failing() -> Self {
        let err = FetchError::Transport("connection refused".to_string());
        Self {
            users: Err(err.clone()),
            reservations: Err(err.clone()),
            parking_spots: Err(err.clone()),
            occupancy: Err(err.clone()),
            statistics: Err(err),
            calls: CallCounts::default(),
        }
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = Ok(users);
        self
    }

    pub fn with_reservations(mut self, reservations: Vec<Reservation>) -> Self {
        self.reservations = Ok(reservations);
        self
    }

    pub fn with_parking_spots(mut self, spots: Vec<ParkingSpot>) -> Self {
        self.parking_spots = Ok(spots);
        self
    }

    pub fn with_occupancy(mut self, snapshots: Vec<OccupancySnapshot>) -> Self {
        self.occupancy = Ok(snapshots);
        self
    }

    pub fn with_statistics(mut self, statistics: StatisticsPayload) -> Self {
        self.statistics = Ok(statistics);
        self
    }

    pub fn failing_reservations(mut self, err: FetchError) -> Self {
        self.reservations = Err(err);
        self
    }

    pub fn failing_users(mut self, err: FetchError) -> Self {
        self.users = Err(err);
        self
    }
}

#[async_trait]
impl ParkingRepository for FakeRepository {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        self.calls.record(&self.calls.users, &self.users).await
    }

    async fn fetch_reservations(&self) -> Result<Vec<Reservation>, FetchError> {
        self.calls.record(&self.calls.reservations, &self.reservations).await
    }

    async fn fetch_parking_spots(&self) -> Result<Vec<ParkingSpot>, FetchError> {
        self.calls.record(&self.calls.parking_spots, &self.parking_spots).await
    }

    async fn fetch_occupancy(&self) -> Result<Vec<OccupancySnapshot>, FetchError> {
        self.calls.record(&self.calls.occupancy, &self.occupancy).await
    }

    async fn fetch_statistics(&self, _mode: EstimateMode) -> Result<StatisticsPayload, FetchError> {
        self.calls.record(&self.calls.statistics, &self.statistics).await
    }
}

pub fn user(id: &str) -> User {
    User { id: id.to_string() }
}

pub fn spot(id: &str) -> ParkingSpot {
    ParkingSpot { id: id.to_string() }
}

pub fn reservation(
    id: &str,
    spot_id: &str,
    status: ReservationStatus,
    start: DateTime<Utc>,
) -> Reservation {
    Reservation {
        id: id.to_string(),
        start_time: Some(start.to_rfc3339()),
        end_time: None,
        status,
        parking_spot_id: Some(spot_id.to_string()),
    }
}

pub fn snapshot(id: &str, occupied: u64, total: u64, recorded_at: DateTime<Utc>) -> OccupancySnapshot {
    OccupancySnapshot {
        id: id.to_string(),
        recorded_at: Some(recorded_at.to_rfc3339()),
        occupied_spots: occupied,
        total_spots: total,
    }
}
