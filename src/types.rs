//! Common types used throughout the rating ledger

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable player identifier. Numeric ids from the host are stored as strings.
pub type PlayerId = String;

/// Which rating pool a registry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    Singles,
    Doubles,
}

impl Pool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::Singles => "singles",
            Pool::Doubles => "doubles",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a match from one participant's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

/// Final score reported by the host. Display only, never used in rating math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub winner: u32,
    pub loser: u32,
}

impl MatchScore {
    pub fn new(winner: Option<u32>, loser: Option<u32>) -> Self {
        Self {
            winner: winner.unwrap_or(0),
            loser: loser.unwrap_or(0),
        }
    }
}

/// Before/after summary of a singles match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglesSummary {
    pub winner_rating_before: i32,
    pub loser_rating_before: i32,
    pub elo_gain: i32,
    pub elo_loss: i32,
    pub bonus: i32,
    pub total_gain: i32,
    pub new_streak: u32,
    pub winner_rating_after: i32,
    pub loser_rating_after: i32,
}

/// Rating movement of one doubles participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantChange {
    pub player_id: PlayerId,
    pub rating_before: i32,
    pub rating_after: i32,
}

/// Before/after summary of a doubles match.
///
/// `winners` and `losers` keep the order the players were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoublesSummary {
    pub delta_win: i32,
    pub delta_loss: i32,
    pub winners: [ParticipantChange; 2],
    pub losers: [ParticipantChange; 2],
}

/// Stats an operator may overwrite directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Rating,
    Wins,
    Losses,
    Streak,
}

impl FromStr for StatField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elo" | "rating" => Ok(StatField::Rating),
            "wins" => Ok(StatField::Wins),
            "losses" => Ok(StatField::Losses),
            "streak" => Ok(StatField::Streak),
            other => Err(format!("Unknown stat: {}", other)),
        }
    }
}

/// Accepts a player id stored either as a JSON string or an integer.
///
/// Older history entries were written with the host's numeric ids.
pub fn deserialize_player_id<'de, D>(deserializer: D) -> Result<PlayerId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Unsigned(id) => id.to_string(),
        RawId::Signed(id) => id.to_string(),
    })
}
