//! Test fixtures for integration testing

#![allow(dead_code)]

use ladder_ledger::config::{AppConfig, RatingConfig};
use ladder_ledger::registry::{DoublesStats, JsonFileStore, SinglesStats};
use ladder_ledger::{DoublesPool, EloCalculator, SinglesPool};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Temporary directory holding one singles and one doubles registry file
pub struct TestLadder {
    pub dir: TempDir,
    pub singles_path: PathBuf,
    pub doubles_path: PathBuf,
}

impl TestLadder {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let singles_path = dir.path().join("data.json");
        let doubles_path = dir.path().join("doubles_data.json");
        Self {
            dir,
            singles_path,
            doubles_path,
        }
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.singles_path = self.singles_path.clone();
        config.storage.doubles_path = self.doubles_path.clone();
        config
    }

    /// A fresh singles pool on this ladder's file
    pub fn singles(&self) -> SinglesPool {
        let store: JsonFileStore<SinglesStats> = JsonFileStore::new(&self.singles_path);
        SinglesPool::new(Arc::new(store), EloCalculator::default()).expect("singles pool")
    }

    /// A fresh doubles pool on this ladder's file
    pub fn doubles(&self) -> DoublesPool {
        let store: JsonFileStore<DoublesStats> = JsonFileStore::new(&self.doubles_path);
        DoublesPool::new(Arc::new(store), EloCalculator::default()).expect("doubles pool")
    }

    pub fn singles_with(&self, config: RatingConfig) -> SinglesPool {
        let store: JsonFileStore<SinglesStats> = JsonFileStore::new(&self.singles_path);
        let calculator = EloCalculator::new(config).expect("valid rating config");
        SinglesPool::new(Arc::new(store), calculator).expect("singles pool")
    }

    pub fn write_singles_json(&self, raw: &str) {
        std::fs::write(&self.singles_path, raw).expect("write singles registry");
    }

    pub fn write_doubles_json(&self, raw: &str) {
        std::fs::write(&self.doubles_path, raw).expect("write doubles registry");
    }

    pub fn read_singles_json(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.singles_path).expect("read singles registry");
        serde_json::from_str(&raw).expect("valid json")
    }

    pub fn read_doubles_json(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.doubles_path).expect("read doubles registry");
        serde_json::from_str(&raw).expect("valid json")
    }
}

/// A legacy singles registry written before peak tracking: numeric ids in
/// history, no peak on one player, a medal list owned by the host.
pub const LEGACY_SINGLES: &str = r#"{
  "111": {
    "elo": 152,
    "wins": 6,
    "losses": 1,
    "first_5_bonus": 5,
    "streak": 4,
    "head_to_head": {"222": {"wins": 3, "losses": 1}},
    "medals": ["🥇 Season 1"],
    "all_time_gain": 80,
    "all_time_loss": 28,
    "match_history": [
      {"winner_id": 111, "opponent_id": 222, "result": "W", "score_w": 3, "score_l": 1,
       "elo_after": 152, "opponent_elo_after": 71}
    ],
    "peak_elo": 152
  },
  "222": {
    "elo": 71,
    "wins": 1,
    "losses": 3,
    "first_5_bonus": 1,
    "streak": 0,
    "head_to_head": {"111": {"wins": 1, "losses": 3}},
    "medals": [],
    "all_time_gain": 17,
    "all_time_loss": 46,
    "match_history": [],
    "title": "Challenger"
  }
}"#;
