// Presentation layer - JSON views over the coordinator and estimator
pub mod app_state;
pub mod handlers;
pub mod router;
