// Domain layer - Records, windows and derived figures
pub mod financial;
pub mod metrics;
pub mod records;
pub mod window;
