//! Application state: both rating pools wired from configuration

use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::rating::EloCalculator;
use crate::registry::{DoublesStats, JsonFileStore, SinglesStats};
use crate::service::pool::{DoublesPool, SinglesPool};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Singles and doubles pools backed by their JSON files
pub struct Ladder {
    pub singles: SinglesPool,
    pub doubles: DoublesPool,
    metrics: Arc<MetricsCollector>,
}

impl Ladder {
    /// Open both pools from `config`. Files are not touched until the first call.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        let calculator =
            EloCalculator::new(config.rating.clone()).context("Invalid rating configuration")?;

        let singles_store: JsonFileStore<SinglesStats> =
            JsonFileStore::new(&config.storage.singles_path);
        let doubles_store: JsonFileStore<DoublesStats> =
            JsonFileStore::new(&config.storage.doubles_path);

        let singles = SinglesPool::new(Arc::new(singles_store), calculator.clone())?
            .with_metrics(metrics.clone());
        let doubles =
            DoublesPool::new(Arc::new(doubles_store), calculator)?.with_metrics(metrics.clone());

        info!(
            "Opened ladder: singles at {}, doubles at {}",
            singles.location(),
            doubles.location()
        );

        Ok(Self {
            singles,
            doubles,
            metrics,
        })
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }
}
