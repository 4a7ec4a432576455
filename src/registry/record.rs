//! Persisted player records
//!
//! A record carries the fields shared by both pools plus a pool-specific
//! `stats` block flattened into the same JSON object. Keys this crate does not
//! know about land in `extra` and are written back untouched.

use crate::config::rating::DEFAULT_INITIAL_RATING;
use crate::types::{deserialize_player_id, MatchResult, MatchScore, PlayerId, Pool};
use crate::utils::apply_with_floor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Pool-specific part of a player record
pub trait PoolStats:
    Default + Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const POOL: Pool;
}

fn default_rating() -> i32 {
    DEFAULT_INITIAL_RATING
}

/// One player's standing in a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord<S> {
    #[serde(rename = "elo", alias = "rating", default = "default_rating")]
    pub rating: i32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub streak: u32,
    /// Owned by the host; never modified here
    #[serde(default)]
    pub medals: Vec<Value>,
    #[serde(default)]
    pub all_time_gain: u64,
    #[serde(default)]
    pub all_time_loss: u64,
    /// `None` only on legacy records that predate peak tracking
    #[serde(
        rename = "peak_elo",
        alias = "peak_rating",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub peak_rating: Option<i32>,
    #[serde(flatten)]
    pub stats: S,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<S: PoolStats> PlayerRecord<S> {
    pub fn new(initial_rating: i32) -> Self {
        Self {
            rating: initial_rating,
            wins: 0,
            losses: 0,
            streak: 0,
            medals: Vec::new(),
            all_time_gain: 0,
            all_time_loss: 0,
            peak_rating: Some(initial_rating),
            stats: S::default(),
            extra: Map::new(),
        }
    }

    /// Fill fields missing from legacy records. Returns true if anything changed.
    pub fn backfill(&mut self) -> bool {
        if self.peak_rating.is_none() {
            self.peak_rating = Some(self.rating);
            return true;
        }
        false
    }

    /// Highest rating held, never below the current one
    pub fn peak_rating(&self) -> i32 {
        self.peak_rating
            .map_or(self.rating, |peak| peak.max(self.rating))
    }

    /// Move to `rating`, keeping the peak at or above both the old and new value.
    /// A legacy record without a peak counts the old rating as its peak.
    fn move_rating(&mut self, rating: i32) {
        let before = self.rating;
        self.rating = rating;
        self.peak_rating = Some(self.peak_rating.unwrap_or(before).max(rating));
    }

    /// Overwrite the rating, clamped to `floor`
    pub fn set_rating(&mut self, rating: i32, floor: i32) {
        self.move_rating(rating.max(floor));
    }

    /// Apply a won match worth `gain` points
    pub fn record_win(&mut self, gain: i32, floor: i32) {
        self.move_rating(apply_with_floor(self.rating, gain, floor));
        self.wins += 1;
        self.streak += 1;
        self.all_time_gain += u64::from(gain.unsigned_abs());
    }

    /// Apply a lost match worth `loss` points
    pub fn record_loss(&mut self, loss: i32, floor: i32) {
        self.move_rating(apply_with_floor(self.rating, -loss, floor));
        self.losses += 1;
        self.streak = 0;
        self.all_time_loss += u64::from(loss.unsigned_abs());
    }
}

/// Cumulative record against one opponent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}

/// One match seen from a single participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "deserialize_player_id")]
    pub winner_id: PlayerId,
    #[serde(deserialize_with = "deserialize_player_id")]
    pub opponent_id: PlayerId,
    pub result: MatchResult,
    #[serde(default)]
    pub score_w: u32,
    #[serde(default)]
    pub score_l: u32,
    pub elo_after: i32,
    pub opponent_elo_after: i32,
}

impl HistoryEntry {
    pub fn new(
        winner_id: &str,
        opponent_id: &str,
        result: MatchResult,
        score: MatchScore,
        elo_after: i32,
        opponent_elo_after: i32,
    ) -> Self {
        Self {
            winner_id: winner_id.to_string(),
            opponent_id: opponent_id.to_string(),
            result,
            score_w: score.winner,
            score_l: score.loser,
            elo_after,
            opponent_elo_after,
        }
    }
}

/// Singles-only fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinglesStats {
    pub first_5_bonus: u32,
    pub head_to_head: BTreeMap<PlayerId, HeadToHead>,
    /// Newest first
    pub match_history: Vec<HistoryEntry>,
}

impl PoolStats for SinglesStats {
    const POOL: Pool = Pool::Singles;
}

impl SinglesStats {
    pub fn head_to_head_mut(&mut self, opponent_id: &str) -> &mut HeadToHead {
        self.head_to_head
            .entry(opponent_id.to_string())
            .or_default()
    }

    /// Insert at the front and drop whatever falls past `limit`
    pub fn push_history(&mut self, entry: HistoryEntry, limit: usize) {
        self.match_history.insert(0, entry);
        self.match_history.truncate(limit);
    }
}

/// Doubles-only fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoublesStats {
    /// Wins achieved together with each teammate
    pub partners: BTreeMap<PlayerId, u32>,
    /// Losses suffered together with each teammate
    pub partners_losses: BTreeMap<PlayerId, u32>,
}

impl PoolStats for DoublesStats {
    const POOL: Pool = Pool::Doubles;
}

impl DoublesStats {
    pub fn add_partner_win(&mut self, partner_id: &str) {
        *self.partners.entry(partner_id.to_string()).or_insert(0) += 1;
    }

    pub fn add_partner_loss(&mut self, partner_id: &str) {
        *self
            .partners_losses
            .entry(partner_id.to_string())
            .or_insert(0) += 1;
    }
}

pub type SinglesRecord = PlayerRecord<SinglesStats>;
pub type DoublesRecord = PlayerRecord<DoublesStats>;
