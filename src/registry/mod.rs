//! Player registry: the id → record mapping for one rating pool
//!
//! The registry is a plain value. [`crate::service::RatingPool`] owns its
//! lifecycle: load at the start of a call, mutate, save before returning.

pub mod record;
pub mod storage;

pub use record::{
    DoublesRecord, DoublesStats, HeadToHead, HistoryEntry, PlayerRecord, PoolStats, SinglesRecord,
    SinglesStats,
};
pub use storage::{InMemoryRegistryStore, JsonFileStore, RegistryStore};

use crate::types::{PlayerId, StatField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// What `register` did to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    Created,
    Backfilled,
    Unchanged,
}

/// All player records of one pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry<S> {
    players: BTreeMap<PlayerId, PlayerRecord<S>>,
}

impl<S: PoolStats> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PoolStats> Registry<S> {
    pub fn new() -> Self {
        Self {
            players: BTreeMap::new(),
        }
    }

    /// Create a default record or backfill a legacy one. Existing values are kept.
    pub fn register(&mut self, player_id: &str, initial_rating: i32) -> Registration {
        match self.players.get_mut(player_id) {
            Some(record) => {
                if record.backfill() {
                    debug!(player_id, pool = S::POOL.as_str(), "Backfilled legacy player record");
                    Registration::Backfilled
                } else {
                    Registration::Unchanged
                }
            }
            None => {
                self.players
                    .insert(player_id.to_string(), PlayerRecord::new(initial_rating));
                Registration::Created
            }
        }
    }

    pub fn lookup(&self, player_id: &str) -> Option<&PlayerRecord<S>> {
        self.players.get(player_id)
    }

    pub fn get_mut(&mut self, player_id: &str) -> Option<&mut PlayerRecord<S>> {
        self.players.get_mut(player_id)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerRecord<S>)> {
        self.players.iter()
    }

    /// Overwrite a single stat. Returns false if the player is unknown.
    ///
    /// Ratings are clamped to `floor` and lift the peak when they exceed it.
    /// Negative counts are stored as zero.
    pub fn set_stat(&mut self, player_id: &str, field: StatField, value: i32, floor: i32) -> bool {
        let Some(record) = self.players.get_mut(player_id) else {
            return false;
        };
        let count = u32::try_from(value).unwrap_or(0);
        match field {
            StatField::Rating => record.set_rating(value, floor),
            StatField::Wins => record.wins = count,
            StatField::Losses => record.losses = count,
            StatField::Streak => record.streak = count,
        }
        true
    }

    /// Records ordered by rating, highest first. Ties are broken by id.
    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<(&PlayerId, &PlayerRecord<S>)> {
        let mut ranked: Vec<_> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.1.rating.cmp(&a.1.rating).then_with(|| a.0.cmp(b.0)));
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        ranked
    }
}
