// Repository trait for the marketplace API
use crate::domain::financial::EstimateMode;
use crate::domain::records::{OccupancySnapshot, ParkingSpot, Reservation, User};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Why a single collection (or the statistics call) could not be loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with status {status}")]
    Status { status: u16 },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("server reported failure: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Users,
    Reservations,
    ParkingSpots,
    Occupancy,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Users => "users",
            Self::Reservations => "reservations",
            Self::ParkingSpots => "parking spots",
            Self::Occupancy => "occupancy",
        };
        f.write_str(name)
    }
}

/// Pre-aggregated figures from the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsPayload {
    #[serde(alias = "gross_revenue", alias = "totalRevenue")]
    pub gross_revenue: f64,
    #[serde(alias = "commissions_paid", alias = "totalCommissions")]
    pub commissions_paid: f64,
    #[serde(default, alias = "percent_change_revenue")]
    pub percent_change_revenue: f64,
    #[serde(default, alias = "percent_change_commissions")]
    pub percent_change_commissions: f64,
    #[serde(default, alias = "currency", alias = "currency_code")]
    pub currency_code: Option<String>,
    #[serde(default, alias = "reservation_count")]
    pub reservation_count: Option<u64>,
}

#[async_trait]
pub trait ParkingRepository: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError>;

    async fn fetch_reservations(&self) -> Result<Vec<Reservation>, FetchError>;

    async fn fetch_parking_spots(&self) -> Result<Vec<ParkingSpot>, FetchError>;

    async fn fetch_occupancy(&self) -> Result<Vec<OccupancySnapshot>, FetchError>;

    /// Query the statistics endpoint for the given audience.
    async fn fetch_statistics(&self, mode: EstimateMode) -> Result<StatisticsPayload, FetchError>;
}
