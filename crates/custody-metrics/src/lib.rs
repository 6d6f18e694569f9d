use std::sync::Arc;

use custody_core::metrics_api::Metric;

pub mod heuristic;
pub mod signals;

pub use heuristic::HeuristicScoreMetric;

/// Metric used to score custody tests.
pub fn default_metric() -> anyhow::Result<Arc<dyn Metric>> {
    heuristic::metric()
}
