//! Doubles match processing
//!
//! Unlike singles, all four participants are registered on the way in.
//! Both members of a team receive the same delta, computed from the team
//! averages; the resulting ratings still differ when the members started apart.

use crate::error::{LadderError, Result};
use crate::rating::EloCalculator;
use crate::registry::{DoublesStats, Registry};
use crate::types::{DoublesSummary, ParticipantChange};
use crate::utils::team_average;
use tracing::debug;

/// Apply a doubles result where `winners` beat `losers`
pub fn process_doubles_match(
    registry: &mut Registry<DoublesStats>,
    calculator: &EloCalculator,
    winners: [&str; 2],
    losers: [&str; 2],
) -> Result<DoublesSummary> {
    let all = [winners[0], winners[1], losers[0], losers[1]];
    for (i, id) in all.iter().enumerate() {
        if all[i + 1..].contains(id) {
            return Err(LadderError::InvalidMatch {
                reason: format!("player {} appears more than once", id),
            });
        }
    }

    let config = calculator.config();
    for id in all {
        registry.register(id, config.initial_rating);
    }

    let rating_of = |registry: &Registry<DoublesStats>, id: &str| {
        registry
            .lookup(id)
            .map(|r| r.rating)
            .ok_or_else(|| LadderError::missing(id))
    };
    let winners_before = [
        rating_of(registry, winners[0])?,
        rating_of(registry, winners[1])?,
    ];
    let losers_before = [
        rating_of(registry, losers[0])?,
        rating_of(registry, losers[1])?,
    ];

    let team_winners = team_average(&winners_before);
    let team_losers = team_average(&losers_before);
    let delta = calculator.rating_delta(team_winners, team_losers);

    debug!(
        team_winners,
        team_losers,
        expected = delta.expected,
        base = delta.base,
        factor = delta.factor,
        delta_win = delta.gain,
        delta_loss = delta.loss,
        "Computed doubles rating delta"
    );

    for (id, partner) in [(winners[0], winners[1]), (winners[1], winners[0])] {
        let record = registry
            .get_mut(id)
            .ok_or_else(|| LadderError::missing(id))?;
        record.record_win(delta.gain, config.rating_floor);
        record.stats.add_partner_win(partner);
    }
    for (id, partner) in [(losers[0], losers[1]), (losers[1], losers[0])] {
        let record = registry
            .get_mut(id)
            .ok_or_else(|| LadderError::missing(id))?;
        record.record_loss(delta.loss, config.rating_floor);
        record.stats.add_partner_loss(partner);
    }

    let change = |registry: &Registry<DoublesStats>, id: &str, before: i32| {
        rating_of(registry, id).map(|after| ParticipantChange {
            player_id: id.to_string(),
            rating_before: before,
            rating_after: after,
        })
    };

    Ok(DoublesSummary {
        delta_win: delta.gain,
        delta_loss: delta.loss,
        winners: [
            change(registry, winners[0], winners_before[0])?,
            change(registry, winners[1], winners_before[1])?,
        ],
        losers: [
            change(registry, losers[0], losers_before[0])?,
            change(registry, losers[1], losers_before[1])?,
        ],
    })
}
