//! Metrics collection using Prometheus
//!
//! This module provides metrics for match processing and registry storage.

use crate::types::Pool;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the ladder
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Match and registration metrics
    ladder_metrics: LadderMetrics,

    /// Storage metrics
    storage_metrics: StorageMetrics,
}

/// Match and registration metrics
#[derive(Clone)]
pub struct LadderMetrics {
    /// Matches applied per pool
    pub matches_total: IntCounterVec,

    /// Operations rejected, by pool and error kind
    pub rejected_total: IntCounterVec,

    /// Players newly created per pool
    pub registrations_total: IntCounterVec,

    /// Players in the registry after the last save
    pub registered_players: IntGaugeVec,

    /// Time from lock acquisition to saved registry
    pub match_duration_seconds: HistogramVec,
}

/// Storage metrics
#[derive(Clone)]
pub struct StorageMetrics {
    /// Load/save operations by pool, operation and status
    pub operations_total: IntCounterVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let ladder_metrics = LadderMetrics::new(&registry)?;
        let storage_metrics = StorageMetrics::new(&registry)?;

        Ok(Self {
            registry,
            ladder_metrics,
            storage_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get ladder metrics
    pub fn ladder(&self) -> &LadderMetrics {
        &self.ladder_metrics
    }

    /// Get storage metrics
    pub fn storage(&self) -> &StorageMetrics {
        &self.storage_metrics
    }

    /// Record a match applied and persisted
    pub fn record_match(&self, pool: Pool, duration: Duration) {
        self.ladder_metrics
            .matches_total
            .with_label_values(&[pool.as_str()])
            .inc();

        self.ladder_metrics
            .match_duration_seconds
            .with_label_values(&[pool.as_str()])
            .observe(duration.as_secs_f64());
    }

    /// Record an operation that failed with the given error kind
    pub fn record_rejected(&self, pool: Pool, kind: &str) {
        self.ladder_metrics
            .rejected_total
            .with_label_values(&[pool.as_str(), kind])
            .inc();
    }

    /// Record players created by a registration or doubles match
    pub fn record_registrations(&self, pool: Pool, created: u64) {
        if created > 0 {
            self.ladder_metrics
                .registrations_total
                .with_label_values(&[pool.as_str()])
                .inc_by(created);
        }
    }

    /// Record the registry size after a save
    pub fn set_registered_players(&self, pool: Pool, count: usize) {
        self.ladder_metrics
            .registered_players
            .with_label_values(&[pool.as_str()])
            .set(count as i64);
    }

    /// Record a storage load or save
    pub fn record_storage_operation(&self, pool: Pool, operation: &str, success: bool) {
        let status = if success { "success" } else { "error" };

        self.storage_metrics
            .operations_total
            .with_label_values(&[pool.as_str(), operation, status])
            .inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl LadderMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_total = IntCounterVec::new(
            Opts::new("ladder_matches_total", "Total matches applied"),
            &["pool"],
        )?;
        registry.register(Box::new(matches_total.clone()))?;

        let rejected_total = IntCounterVec::new(
            Opts::new("ladder_rejected_total", "Total operations rejected"),
            &["pool", "kind"],
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        let registrations_total = IntCounterVec::new(
            Opts::new("ladder_registrations_total", "Total players registered"),
            &["pool"],
        )?;
        registry.register(Box::new(registrations_total.clone()))?;

        let registered_players = IntGaugeVec::new(
            Opts::new("ladder_registered_players", "Players in the registry"),
            &["pool"],
        )?;
        registry.register(Box::new(registered_players.clone()))?;

        let match_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ladder_match_duration_seconds",
                "Time to apply and persist a match",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["pool"],
        )?;
        registry.register(Box::new(match_duration_seconds.clone()))?;

        Ok(Self {
            matches_total,
            rejected_total,
            registrations_total,
            registered_players,
            match_duration_seconds,
        })
    }
}

impl StorageMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operations_total = IntCounterVec::new(
            Opts::new("ladder_storage_operations_total", "Registry loads and saves"),
            &["pool", "operation", "status"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        Ok(Self { operations_total })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
