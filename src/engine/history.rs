//! Match history log for the singles pool
//!
//! Recording history is kept apart from computing ratings: the caller passes
//! already-final ratings, which lets a host log or correct a match without
//! re-running the rating model.

use crate::error::{LadderError, Result};
use crate::registry::{HistoryEntry, Registry, SinglesStats};
use crate::types::{MatchResult, MatchScore};

/// Append one entry to each participant's history, newest first, bounded by `limit`
pub fn append_match_history(
    registry: &mut Registry<SinglesStats>,
    winner_id: &str,
    loser_id: &str,
    score: MatchScore,
    winner_rating_after: i32,
    loser_rating_after: i32,
    limit: usize,
) -> Result<()> {
    if !registry.contains(winner_id) {
        return Err(LadderError::missing(winner_id));
    }
    if !registry.contains(loser_id) {
        return Err(LadderError::missing(loser_id));
    }

    let winner_entry = HistoryEntry::new(
        winner_id,
        loser_id,
        MatchResult::Win,
        score,
        winner_rating_after,
        loser_rating_after,
    );
    let loser_entry = HistoryEntry::new(
        winner_id,
        winner_id,
        MatchResult::Loss,
        score,
        loser_rating_after,
        winner_rating_after,
    );

    if let Some(winner) = registry.get_mut(winner_id) {
        winner.stats.push_history(winner_entry, limit);
    }
    if let Some(loser) = registry.get_mut(loser_id) {
        loser.stats.push_history(loser_entry, limit);
    }
    Ok(())
}
