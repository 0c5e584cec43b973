use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_users_path")]
    pub users_path: String,
    #[serde(default = "default_reservations_path")]
    pub reservations_path: String,
    #[serde(default = "default_parking_spots_path")]
    pub parking_spots_path: String,
    #[serde(default = "default_occupancy_path")]
    pub occupancy_path: String,
    #[serde(default = "default_admin_stats_path")]
    pub admin_stats_path: String,
    #[serde(default = "default_user_stats_path")]
    pub user_stats_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Environment variable holding the bearer token.
    pub token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: "DASHBOARD_API_TOKEN".to_string(),
        }
    }
}

/// Constants for the fallback revenue estimate. These are working
/// assumptions, not pricing data.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub average_revenue_per_reservation: f64,
    pub commission_rate: f64,
    pub currency_code: String,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            average_revenue_per_reservation: 15.0,
            commission_rate: 0.10,
            currency_code: "EUR".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

fn default_users_path() -> String {
    "/users".to_string()
}

fn default_reservations_path() -> String {
    "/reservations".to_string()
}

fn default_parking_spots_path() -> String {
    "/parking-spots".to_string()
}

fn default_occupancy_path() -> String {
    "/statistics/occupancy".to_string()
}

fn default_admin_stats_path() -> String {
    "/statistics/admin".to_string()
}

fn default_user_stats_path() -> String {
    "/statistics/user".to_string()
}

fn default_request_timeout_secs() -> u64 {
    20
}

/// Load `config/dashboard.*`, with `DASHBOARD__SECTION__KEY` environment
/// variables taking precedence.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
