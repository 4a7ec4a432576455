//! Metrics for match processing and registry storage

pub mod collector;

pub use collector::{LadderMetrics, MetricsCollector, MetricsTimer, StorageMetrics};
