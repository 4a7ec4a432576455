//! Expected-score model and disparity-scaled rating deltas
//!
//! Both the singles and doubles engines feed their (winner, loser) side
//! ratings through [`EloCalculator::rating_delta`]. For doubles the sides are
//! team averages.

use crate::config::RatingConfig;
use crate::utils::rating_difference;
use serde::{Deserialize, Serialize};

/// Probability that side `a` beats side `b` on a logistic curve
pub fn expected_score(rating_a: f64, rating_b: f64, scale: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / scale))
}

/// Magnitudes produced for one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingDelta {
    /// Expected score of the winning side
    pub expected: f64,
    /// `ceil(K * (1 - expected))` before disparity scaling
    pub base: i32,
    /// Normalized disparity in `[0, 1]`
    pub factor: f64,
    /// Points added to each winner, bonus excluded
    pub gain: i32,
    /// Points removed from each loser
    pub loss: i32,
}

/// Rating calculator driven by [`RatingConfig`]
#[derive(Debug, Clone)]
pub struct EloCalculator {
    config: RatingConfig,
}

impl EloCalculator {
    pub fn new(config: RatingConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn expected_score(&self, rating_a: f64, rating_b: f64) -> f64 {
        expected_score(rating_a, rating_b, self.config.scale)
    }

    /// Map the rating gap onto `[0, 1]` after clamping it into the disparity range
    pub fn disparity_factor(&self, winner: f64, loser: f64) -> f64 {
        let min = self.config.disparity_min;
        let max = self.config.disparity_max;
        let capped = rating_difference(winner, loser).clamp(min, max);
        (capped - min) / (max - min)
    }

    /// Compute gain and loss for a match the `winner` side won.
    ///
    /// An underdog win scales the gain up by `1 + factor`; a favourite win
    /// scales the loss down by `1 - factor`. Each side is ceiling-rounded on
    /// its own.
    pub fn rating_delta(&self, winner: f64, loser: f64) -> RatingDelta {
        let expected = self.expected_score(winner, loser);
        let base = (self.config.k_factor * (1.0 - expected)).ceil();
        let factor = self.disparity_factor(winner, loser);

        let win_scale = if winner < loser { 1.0 + factor } else { 1.0 };
        let loss_scale = if loser < winner { 1.0 - factor } else { 1.0 };

        RatingDelta {
            expected,
            base: base as i32,
            factor,
            gain: (base * win_scale).ceil() as i32,
            loss: (base * loss_scale).ceil() as i32,
        }
    }

    /// Flat bonus for a singles winner who had fewer than the threshold wins
    pub fn new_player_bonus(&self, wins_before: u32) -> i32 {
        if wins_before < self.config.bonus_win_threshold {
            self.config.new_player_bonus
        } else {
            0
        }
    }
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self {
            config: RatingConfig::default(),
        }
    }
}
