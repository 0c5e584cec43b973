// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod credentials;
pub mod envelope;
pub mod http_repository;
