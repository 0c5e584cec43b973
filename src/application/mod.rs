// Application layer - Fetching, caching and deriving dashboard figures
pub mod collection_fetcher;
pub mod credentials;
pub mod financial_estimator;
pub mod metrics_coordinator;
pub mod parking_repository;
pub mod session_cache;
pub mod window_filter;

#[cfg(test)]
pub mod testing;
