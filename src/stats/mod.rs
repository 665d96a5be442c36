//! Statistics for the comet endpoint

pub mod metrics;

pub use metrics::{CometStats, StatsSnapshot};
