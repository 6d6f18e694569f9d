pub mod analytics;
pub mod config;
pub mod engine;
pub mod errors;
pub mod metrics_api;
pub mod model;
pub mod on_error;
pub mod progression;
pub mod providers;
pub mod report;
pub mod storage;
pub mod thresholds;
