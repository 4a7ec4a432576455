//! One rating pool bound to its storage location
//!
//! Every public operation takes the location's lock, loads the registry,
//! applies the change and saves before returning. Nothing is cached between
//! calls, and a failed operation saves nothing.

use crate::engine;
use crate::error::{LadderError, Result};
use crate::metrics::MetricsCollector;
use crate::rating::EloCalculator;
use crate::registry::{
    DoublesStats, PlayerRecord, PoolStats, Registration, Registry, RegistryStore, SinglesStats,
};
use crate::service::lock::lock_for;
use crate::types::{DoublesSummary, MatchScore, PlayerId, SinglesSummary, StatField};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Rating pool with serialized load-mutate-save access
pub struct RatingPool<S: PoolStats> {
    store: Arc<dyn RegistryStore<S>>,
    calculator: EloCalculator,
    metrics: Option<Arc<MetricsCollector>>,
    guard: Arc<Mutex<()>>,
    location: String,
}

pub type SinglesPool = RatingPool<SinglesStats>;
pub type DoublesPool = RatingPool<DoublesStats>;

impl<S: PoolStats> RatingPool<S> {
    /// Bind a pool to `store`, sharing the lock of any other pool on the same location
    pub fn new(store: Arc<dyn RegistryStore<S>>, calculator: EloCalculator) -> Result<Self> {
        let location = store.location();
        let guard = lock_for(&location)?;
        Ok(Self {
            store,
            calculator,
            metrics: None,
            guard,
            location,
        })
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn calculator(&self) -> &EloCalculator {
        &self.calculator
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn load(&self) -> Result<Registry<S>> {
        let result = self.store.load();
        if let Some(metrics) = &self.metrics {
            metrics.record_storage_operation(S::POOL, "load", result.is_ok());
        }
        result
    }

    fn save(&self, registry: &Registry<S>) -> Result<()> {
        let result = self.store.save(registry);
        if let Some(metrics) = &self.metrics {
            metrics.record_storage_operation(S::POOL, "save", result.is_ok());
            if result.is_ok() {
                metrics.set_registered_players(S::POOL, registry.len());
            }
        }
        result
    }

    /// Run `op` on a freshly loaded registry and persist it if `op` succeeds
    pub fn transaction<T>(
        &self,
        operation: &str,
        op: impl FnOnce(&mut Registry<S>, &EloCalculator) -> Result<T>,
    ) -> Result<T> {
        let result = self.locked(|| {
            let mut registry = self.load()?;
            let value = op(&mut registry, &self.calculator)?;
            self.save(&registry)?;
            Ok(value)
        });
        self.observe(operation, result)
    }

    /// Load the registry without modifying it
    pub fn snapshot(&self) -> Result<Registry<S>> {
        let result = self.locked(|| self.load());
        self.observe("snapshot", result)
    }

    fn locked<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self.guard.lock().map_err(|_| LadderError::LockPoisoned {
            location: self.location.clone(),
        })?;
        f()
    }

    fn observe<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(
                "{} operation '{}' failed on {}: {}",
                S::POOL,
                operation,
                self.location,
                e
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_rejected(S::POOL, e.kind());
            }
        }
        result
    }

    /// Create or backfill a player record
    pub fn register(&self, player_id: &str) -> Result<Registration> {
        let registration = self.transaction("register", |registry, calculator| {
            Ok(registry.register(player_id, calculator.config().initial_rating))
        })?;

        if registration == Registration::Created {
            info!("Registered {} player '{}'", S::POOL, player_id);
            if let Some(metrics) = &self.metrics {
                metrics.record_registrations(S::POOL, 1);
            }
        }
        Ok(registration)
    }

    /// Current record of a player, `None` if unknown
    pub fn lookup(&self, player_id: &str) -> Result<Option<PlayerRecord<S>>> {
        Ok(self.snapshot()?.lookup(player_id).cloned())
    }

    /// Overwrite one stat of an existing player. Returns false for unknown ids.
    pub fn set_stat(&self, player_id: &str, field: StatField, value: i32) -> Result<bool> {
        let updated = self.transaction("set_stat", |registry, calculator| {
            Ok(registry.set_stat(
                player_id,
                field,
                value,
                calculator.config().rating_floor,
            ))
        })?;

        if updated {
            info!(
                "Set {:?} = {} for {} player '{}'",
                field,
                value,
                S::POOL,
                player_id
            );
        }
        Ok(updated)
    }

    /// Players ordered by rating, highest first
    pub fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<(PlayerId, PlayerRecord<S>)>> {
        let registry = self.snapshot()?;
        Ok(registry
            .leaderboard(limit)
            .into_iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect())
    }
}

impl RatingPool<SinglesStats> {
    /// Apply and persist a singles result. Both players must be registered.
    pub fn process_match(
        &self,
        winner_id: &str,
        loser_id: &str,
        score_w: Option<u32>,
        score_l: Option<u32>,
    ) -> Result<SinglesSummary> {
        let timer = self.metrics.as_ref().map(|m| m.start_timer());
        let score = MatchScore::new(score_w, score_l);

        let summary = self.transaction("process_match", |registry, calculator| {
            engine::process_match(registry, calculator, winner_id, loser_id, score)
        })?;

        info!(
            "Singles match: '{}' {} -> {} (+{}), '{}' {} -> {} (-{})",
            winner_id,
            summary.winner_rating_before,
            summary.winner_rating_after,
            summary.total_gain,
            loser_id,
            summary.loser_rating_before,
            summary.loser_rating_after,
            summary.elo_loss
        );
        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_match(SinglesStats::POOL, timer.stop());
        }
        Ok(summary)
    }

    /// Log a match in both players' histories using already-final ratings
    pub fn append_match_history(
        &self,
        winner_id: &str,
        loser_id: &str,
        score: MatchScore,
        winner_rating_after: i32,
        loser_rating_after: i32,
    ) -> Result<()> {
        self.transaction("append_match_history", |registry, calculator| {
            engine::append_match_history(
                registry,
                winner_id,
                loser_id,
                score,
                winner_rating_after,
                loser_rating_after,
                calculator.config().history_limit,
            )
        })?;
        debug!(
            "Logged history for '{}' vs '{}' ({}-{})",
            winner_id, loser_id, score.winner, score.loser
        );
        Ok(())
    }
}

impl RatingPool<DoublesStats> {
    /// Apply and persist a doubles result, registering any new players
    pub fn process_doubles_match(
        &self,
        a1: &str,
        a2: &str,
        b1: &str,
        b2: &str,
    ) -> Result<DoublesSummary> {
        let timer = self.metrics.as_ref().map(|m| m.start_timer());

        let (summary, created) = self.transaction("process_doubles_match", |registry, calculator| {
            let created = [a1, a2, b1, b2]
                .iter()
                .filter(|id| !registry.contains(id))
                .count();
            let summary = engine::process_doubles_match(registry, calculator, [a1, a2], [b1, b2])?;
            Ok((summary, created))
        })?;

        info!(
            "Doubles match: '{}' & '{}' beat '{}' & '{}' (+{} / -{})",
            a1, a2, b1, b2, summary.delta_win, summary.delta_loss
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_registrations(DoublesStats::POOL, created as u64);
            if let Some(timer) = timer {
                metrics.record_match(DoublesStats::POOL, timer.stop());
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::storage::MockRegistryStore;
    use crate::registry::{InMemoryRegistryStore, JsonFileStore};
    use std::io::ErrorKind;

    fn seeded_singles() -> Registry<SinglesStats> {
        let mut registry = Registry::new();
        registry.register("w", 100);
        registry.register("l", 100);
        registry
    }

    fn disk_full(location: &str) -> LadderError {
        LadderError::StorageUnavailable {
            location: location.to_string(),
            source: std::io::Error::new(ErrorKind::Other, "disk full"),
        }
    }

    #[test]
    fn test_match_is_persisted() {
        let store = Arc::new(InMemoryRegistryStore::with_registry(seeded_singles()));
        let pool = SinglesPool::new(store.clone(), EloCalculator::default()).unwrap();

        let summary = pool.process_match("w", "l", Some(3), Some(0)).unwrap();
        assert_eq!(summary.winner_rating_after, 117);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap().lookup("w").unwrap().rating, 117);
    }

    #[test]
    fn test_missing_participant_saves_nothing() {
        let store = Arc::new(InMemoryRegistryStore::<SinglesStats>::new());
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let pool = SinglesPool::new(store.clone(), EloCalculator::default())
            .unwrap()
            .with_metrics(metrics.clone());

        pool.register("w").unwrap();
        let err = pool.process_match("w", "l", None, None).unwrap_err();
        assert!(matches!(err, LadderError::MissingParticipant { .. }));
        assert_eq!(store.save_count(), 1);
        assert_eq!(
            metrics
                .ladder()
                .rejected_total
                .with_label_values(&["singles", "missing_participant"])
                .get(),
            1
        );
    }

    #[test]
    fn test_save_failure_is_reported() {
        let mut store = MockRegistryStore::<SinglesStats>::new();
        store
            .expect_location()
            .return_const("mock://singles/save-failure".to_string());
        let seeded = seeded_singles();
        store
            .expect_load()
            .times(1)
            .returning(move || Ok(seeded.clone()));
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(disk_full("mock://singles/save-failure")));

        let pool = SinglesPool::new(Arc::new(store), EloCalculator::default()).unwrap();
        let err = pool.process_match("w", "l", None, None).unwrap_err();
        assert!(matches!(err, LadderError::StorageUnavailable { .. }));
    }

    #[test]
    fn test_load_failure_skips_save() {
        let mut store = MockRegistryStore::<DoublesStats>::new();
        store
            .expect_location()
            .return_const("mock://doubles/load-failure".to_string());
        store
            .expect_load()
            .times(1)
            .returning(|| Err(disk_full("mock://doubles/load-failure")));
        store.expect_save().never();

        let pool = DoublesPool::new(Arc::new(store), EloCalculator::default()).unwrap();
        let err = pool.process_doubles_match("1", "2", "3", "4").unwrap_err();
        assert!(matches!(err, LadderError::StorageUnavailable { .. }));
    }

    #[test]
    fn test_saved_registry_contains_match() {
        let mut store = MockRegistryStore::<DoublesStats>::new();
        store
            .expect_location()
            .return_const("mock://doubles/saved".to_string());
        store.expect_load().returning(|| Ok(Registry::new()));
        store
            .expect_save()
            .withf(|registry: &Registry<DoublesStats>| {
                registry.len() == 4 && registry.lookup("1").map(|r| r.rating) == Some(112)
            })
            .times(1)
            .returning(|_| Ok(()));

        let pool = DoublesPool::new(Arc::new(store), EloCalculator::default()).unwrap();
        let summary = pool.process_doubles_match("1", "2", "3", "4").unwrap();
        assert_eq!(summary.delta_win, 12);
    }

    #[test]
    fn test_register_lookup_and_set_stat() {
        let store = Arc::new(InMemoryRegistryStore::<DoublesStats>::new());
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let pool = DoublesPool::new(store, EloCalculator::default())
            .unwrap()
            .with_metrics(metrics.clone());

        assert!(pool.lookup("9").unwrap().is_none());
        assert_eq!(pool.register("9").unwrap(), Registration::Created);
        assert_eq!(pool.register("9").unwrap(), Registration::Unchanged);
        assert!(pool.set_stat("9", StatField::Rating, 180).unwrap());
        assert!(!pool.set_stat("10", StatField::Rating, 180).unwrap());

        let record = pool.lookup("9").unwrap().unwrap();
        assert_eq!(record.rating, 180);
        assert_eq!(record.peak_rating, Some(180));
        assert_eq!(
            metrics
                .ladder()
                .registrations_total
                .with_label_values(&["doubles"])
                .get(),
            1
        );
    }

    #[test]
    fn test_pools_on_same_location_share_lock() {
        let store = Arc::new(InMemoryRegistryStore::<SinglesStats>::new());
        let a = SinglesPool::new(store.clone(), EloCalculator::default()).unwrap();
        let b = SinglesPool::new(store, EloCalculator::default()).unwrap();
        assert!(Arc::ptr_eq(&a.guard, &b.guard));
    }

    #[test]
    fn test_path_spellings_share_lock() {
        let dir = tempfile::tempdir().unwrap();
        let plain: JsonFileStore<SinglesStats> = JsonFileStore::new(dir.path().join("data.json"));
        let dotted: JsonFileStore<SinglesStats> =
            JsonFileStore::new(dir.path().join(".").join("data.json"));

        let a = SinglesPool::new(Arc::new(plain), EloCalculator::default()).unwrap();
        let b = SinglesPool::new(Arc::new(dotted), EloCalculator::default()).unwrap();
        assert_eq!(a.location(), b.location());
        assert!(Arc::ptr_eq(&a.guard, &b.guard));
    }
}
