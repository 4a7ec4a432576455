//! Singles match processing

use crate::engine::history::append_match_history;
use crate::error::{LadderError, Result};
use crate::rating::EloCalculator;
use crate::registry::{Registry, SinglesStats};
use crate::types::{MatchScore, SinglesSummary};
use tracing::debug;

/// Apply a singles result to the registry.
///
/// Both players must already be registered; an unknown id fails with
/// [`LadderError::MissingParticipant`] before anything is modified.
pub fn process_match(
    registry: &mut Registry<SinglesStats>,
    calculator: &EloCalculator,
    winner_id: &str,
    loser_id: &str,
    score: MatchScore,
) -> Result<SinglesSummary> {
    if winner_id == loser_id {
        return Err(LadderError::InvalidMatch {
            reason: format!("player {} cannot play against themselves", winner_id),
        });
    }

    let (winner_before, winner_wins) = registry
        .lookup(winner_id)
        .map(|r| (r.rating, r.wins))
        .ok_or_else(|| LadderError::missing(winner_id))?;
    let loser_before = registry
        .lookup(loser_id)
        .map(|r| r.rating)
        .ok_or_else(|| LadderError::missing(loser_id))?;

    let config = calculator.config();
    let delta = calculator.rating_delta(f64::from(winner_before), f64::from(loser_before));
    let bonus = calculator.new_player_bonus(winner_wins);
    let total_gain = delta.gain + bonus;

    debug!(
        winner_id,
        loser_id,
        expected = delta.expected,
        base = delta.base,
        factor = delta.factor,
        gain = delta.gain,
        loss = delta.loss,
        bonus,
        "Computed singles rating delta"
    );

    let (winner_after, new_streak) = {
        let winner = registry
            .get_mut(winner_id)
            .ok_or_else(|| LadderError::missing(winner_id))?;
        winner.record_win(total_gain, config.rating_floor);
        if bonus > 0 {
            winner.stats.first_5_bonus += 1;
        }
        winner.stats.head_to_head_mut(loser_id).wins += 1;
        (winner.rating, winner.streak)
    };

    let loser_after = {
        let loser = registry
            .get_mut(loser_id)
            .ok_or_else(|| LadderError::missing(loser_id))?;
        loser.record_loss(delta.loss, config.rating_floor);
        loser.stats.head_to_head_mut(winner_id).losses += 1;
        loser.rating
    };

    append_match_history(
        registry,
        winner_id,
        loser_id,
        score,
        winner_after,
        loser_after,
        config.history_limit,
    )?;

    Ok(SinglesSummary {
        winner_rating_before: winner_before,
        loser_rating_before: loser_before,
        elo_gain: delta.gain,
        elo_loss: delta.loss,
        bonus,
        total_gain,
        new_streak,
        winner_rating_after: winner_after,
        loser_rating_after: loser_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchResult;

    fn setup(players: &[(&str, i32)]) -> Registry<SinglesStats> {
        let mut registry = Registry::new();
        for (id, rating) in players {
            registry.register(id, *rating);
        }
        registry
    }

    #[test]
    fn test_fresh_players_bonus_scenario() {
        let mut registry = setup(&[("w", 100), ("l", 100)]);
        let calc = EloCalculator::default();
        let summary =
            process_match(&mut registry, &calc, "w", "l", MatchScore::new(Some(2), Some(1)))
                .unwrap();

        assert_eq!(summary.elo_gain, 12);
        assert_eq!(summary.bonus, 5);
        assert_eq!(summary.total_gain, 17);
        assert_eq!(summary.elo_loss, 12);
        assert_eq!(summary.winner_rating_after, 117);
        assert_eq!(summary.loser_rating_after, 88);
        assert_eq!(summary.new_streak, 1);

        let w = registry.lookup("w").unwrap();
        assert_eq!(w.stats.first_5_bonus, 1);
        assert_eq!(w.all_time_gain, 17);
        assert_eq!(w.peak_rating, Some(117));
        assert_eq!(w.stats.head_to_head["l"].wins, 1);

        let l = registry.lookup("l").unwrap();
        assert_eq!(l.all_time_loss, 12);
        assert_eq!(l.peak_rating, Some(100));
        assert_eq!(l.stats.head_to_head["w"].losses, 1);
        assert_eq!(l.stats.match_history[0].result, MatchResult::Loss);
        assert_eq!(l.stats.match_history[0].score_w, 2);
    }

    #[test]
    fn test_upset_scenario() {
        let mut registry = setup(&[("under", 100), ("fav", 300)]);
        let calc = EloCalculator::default();
        let summary =
            process_match(&mut registry, &calc, "under", "fav", MatchScore::default()).unwrap();

        assert_eq!(summary.elo_gain, 44);
        assert_eq!(summary.bonus, 5);
        assert_eq!(summary.total_gain, 49);
        assert_eq!(summary.elo_loss, 22);
        assert_eq!(summary.winner_rating_after, 149);
        assert_eq!(summary.loser_rating_after, 278);
    }

    #[test]
    fn test_no_bonus_after_five_wins() {
        let mut registry = setup(&[("w", 100), ("l", 100)]);
        registry.get_mut("w").unwrap().wins = 5;
        let calc = EloCalculator::default();
        let summary =
            process_match(&mut registry, &calc, "w", "l", MatchScore::default()).unwrap();
        assert_eq!(summary.bonus, 0);
        assert_eq!(summary.total_gain, 12);
        assert_eq!(registry.lookup("w").unwrap().stats.first_5_bonus, 0);
    }

    #[test]
    fn test_loser_clamped_to_floor() {
        let mut registry = setup(&[("w", 100), ("l", 100)]);
        registry.get_mut("l").unwrap().rating = 7;
        registry.get_mut("w").unwrap().rating = 7;
        let calc = EloCalculator::default();
        let summary =
            process_match(&mut registry, &calc, "w", "l", MatchScore::default()).unwrap();
        assert_eq!(summary.loser_rating_after, 5);
        assert_eq!(registry.lookup("l").unwrap().rating, 5);
    }

    #[test]
    fn test_streaks() {
        let mut registry = setup(&[("a", 100), ("b", 100)]);
        let calc = EloCalculator::default();
        process_match(&mut registry, &calc, "a", "b", MatchScore::default()).unwrap();
        let summary =
            process_match(&mut registry, &calc, "a", "b", MatchScore::default()).unwrap();
        assert_eq!(summary.new_streak, 2);
        assert_eq!(registry.lookup("b").unwrap().streak, 0);

        let summary =
            process_match(&mut registry, &calc, "b", "a", MatchScore::default()).unwrap();
        assert_eq!(summary.new_streak, 1);
        assert_eq!(registry.lookup("a").unwrap().streak, 0);

        let a = registry.lookup("a").unwrap();
        assert_eq!(a.stats.head_to_head["b"].wins, 2);
        assert_eq!(a.stats.head_to_head["b"].losses, 1);
        assert_eq!(a.stats.match_history.len(), 3);
        assert_eq!(a.stats.match_history[0].result, MatchResult::Loss);
    }

    #[test]
    fn test_missing_participant_leaves_registry_untouched() {
        let mut registry = setup(&[("w", 100)]);
        let before = registry.clone();
        let calc = EloCalculator::default();

        let err =
            process_match(&mut registry, &calc, "w", "ghost", MatchScore::default()).unwrap_err();
        assert!(matches!(err, LadderError::MissingParticipant { ref player_id } if player_id == "ghost"));

        let err =
            process_match(&mut registry, &calc, "ghost", "w", MatchScore::default()).unwrap_err();
        assert!(matches!(err, LadderError::MissingParticipant { .. }));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_self_match_rejected() {
        let mut registry = setup(&[("w", 100)]);
        let calc = EloCalculator::default();
        let err = process_match(&mut registry, &calc, "w", "w", MatchScore::default()).unwrap_err();
        assert!(matches!(err, LadderError::InvalidMatch { .. }));
    }

    #[test]
    fn test_legacy_peak_covers_both_ratings_held() {
        let mut registry: Registry<SinglesStats> = serde_json::from_str(
            r#"{"w": {"elo": 150, "wins": 9}, "l": {"elo": 150, "wins": 9}}"#,
        )
        .unwrap();
        let calc = EloCalculator::default();
        let summary =
            process_match(&mut registry, &calc, "w", "l", MatchScore::default()).unwrap();
        assert_eq!(
            registry.lookup("w").unwrap().peak_rating,
            Some(summary.winner_rating_after)
        );
        assert_eq!(registry.lookup("l").unwrap().peak_rating, Some(150));
    }
}
