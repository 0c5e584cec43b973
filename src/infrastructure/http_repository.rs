// Marketplace API repository over HTTP
use crate::application::credentials::CredentialProvider;
use crate::application::parking_repository::{
    CollectionKind, FetchError, ParkingRepository, StatisticsPayload,
};
use crate::domain::financial::EstimateMode;
use crate::domain::records::{OccupancySnapshot, ParkingSpot, Reservation, User};
use crate::infrastructure::config::ApiConfig;
use crate::infrastructure::envelope::{decode_records, unwrap_collection, unwrap_object};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct HttpParkingRepository {
    client: reqwest::Client,
    base_url: String,
    api: ApiConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpParkingRepository {
    pub fn new(api: ApiConfig, credentials: Arc<dyn CredentialProvider>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api,
            credentials,
        })
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json");
        match self.credentials.bearer_token() {
            Some(token) => request = request.bearer_auth(token),
            None => tracing::debug!("No credential available, calling {} unauthenticated", url),
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("GET {} failed with status {}: {}", url, status, body);
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        kind: CollectionKind,
        path: &str,
    ) -> Result<Vec<T>, FetchError> {
        let body = self.get_json(path).await?;
        let items = unwrap_collection(kind, body)?;
        let records = decode_records(kind, items);
        tracing::debug!("Fetched {} {} records", records.len(), kind);
        Ok(records)
    }
}

#[async_trait]
impl ParkingRepository for HttpParkingRepository {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        self.fetch_collection(CollectionKind::Users, &self.api.users_path)
            .await
    }

    async fn fetch_reservations(&self) -> Result<Vec<Reservation>, FetchError> {
        self.fetch_collection(CollectionKind::Reservations, &self.api.reservations_path)
            .await
    }

    async fn fetch_parking_spots(&self) -> Result<Vec<ParkingSpot>, FetchError> {
        self.fetch_collection(CollectionKind::ParkingSpots, &self.api.parking_spots_path)
            .await
    }

    async fn fetch_occupancy(&self) -> Result<Vec<OccupancySnapshot>, FetchError> {
        self.fetch_collection(CollectionKind::Occupancy, &self.api.occupancy_path)
            .await
    }

    async fn fetch_statistics(&self, mode: EstimateMode) -> Result<StatisticsPayload, FetchError> {
        let path = match mode {
            EstimateMode::Admin => &self.api.admin_stats_path,
            EstimateMode::User => &self.api.user_stats_path,
        };
        let body = self.get_json(path).await?;
        let payload = unwrap_object(body)?;
        serde_json::from_value(payload).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
