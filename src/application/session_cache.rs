// Session cache - Last fetched collections shared by every consumer
use crate::application::collection_fetcher::{FetchResult, Outcome};
use crate::application::parking_repository::FetchError;
use crate::domain::records::{OccupancySnapshot, ParkingSpot, Reservation, User};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Age after which the cached collections are refetched on the next refresh.
pub const STALE_AFTER: Duration = Duration::minutes(5);

/// One collection as last seen. `Absent` means it was never fetched, which
/// is not the same as having fetched it and failed.
#[derive(Debug, Clone)]
pub enum CollectionSlot<T> {
    Absent,
    Loaded(Vec<T>),
    Failed(FetchError),
}

impl<T> Default for CollectionSlot<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Outcome<T>> for CollectionSlot<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Ok(items) => Self::Loaded(items),
            Err(e) => Self::Failed(e),
        }
    }
}

impl<T> CollectionSlot<T> {
    pub fn loaded(&self) -> Option<&[T]> {
        match self {
            Self::Loaded(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    pub users: CollectionSlot<User>,
    pub reservations: CollectionSlot<Reservation>,
    pub parking_spots: CollectionSlot<ParkingSpot>,
    pub occupancy: CollectionSlot<OccupancySnapshot>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn from_fetch(result: FetchResult, fetched_at: DateTime<Utc>) -> Self {
        Self {
            users: result.users.into(),
            reservations: result.reservations.into(),
            parking_spots: result.parking_spots.into(),
            occupancy: result.occupancy.into(),
            last_fetched_at: Some(fetched_at),
        }
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.last_fetched_at {
            Some(fetched_at) => now - fetched_at > max_age,
            None => true,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.users.is_failed()
            || self.reservations.is_failed()
            || self.parking_spots.is_failed()
            || self.occupancy.is_failed()
    }
}

/// The one cache for the session. Clones share the same state.
///
/// Each `put` swaps in a whole new entry, so readers always see collections
/// from a single fetch round.
#[derive(Clone, Debug, Default)]
pub struct SessionCache {
    inner: Arc<RwLock<Arc<CacheEntry>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Arc<CacheEntry> {
        self.inner.read().await.clone()
    }

    pub async fn put(&self, entry: CacheEntry) {
        let mut current = self.inner.write().await;
        *current = Arc::new(entry);
    }

    /// Drop everything cached; the next refresh always refetches.
    pub async fn invalidate(&self) {
        tracing::debug!("Invalidating session cache");
        let mut current = self.inner.write().await;
        *current = Arc::new(CacheEntry::default());
    }

    pub async fn is_stale(&self, max_age: Duration) -> bool {
        self.get().await.is_stale_at(Utc::now(), max_age)
    }
}
