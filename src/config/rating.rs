//! Rating system configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_RATING: i32 = 100;

/// Parameters of the expected-score and disparity-scaling model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Base K-factor
    pub k_factor: f64,
    /// Rating difference that makes one side ten times as likely to win
    pub scale: f64,
    /// Rating given to a newly registered player
    pub initial_rating: i32,
    /// No rating may fall below this value
    pub rating_floor: i32,
    /// Disparities below this count as an even match
    pub disparity_min: f64,
    /// Disparities above this are scaled as if equal to it
    pub disparity_max: f64,
    /// Flat gain added for a singles win while under the threshold
    pub new_player_bonus: i32,
    /// Wins (before the match) below which the bonus applies
    pub bonus_win_threshold: u32,
    /// Match history entries kept per player
    pub history_limit: usize,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: 24.0,
            scale: 200.0,
            initial_rating: DEFAULT_INITIAL_RATING,
            rating_floor: 5,
            disparity_min: 3.0,
            disparity_max: 200.0,
            new_player_bonus: 5,
            bonus_win_threshold: 5,
            history_limit: 10,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.k_factor <= 0.0 {
            return Err(anyhow!("K-factor must be positive"));
        }
        if self.scale <= 0.0 {
            return Err(anyhow!("Rating scale must be positive"));
        }
        if self.disparity_min < 0.0 || self.disparity_max <= self.disparity_min {
            return Err(anyhow!(
                "Disparity range must satisfy 0 <= min < max (got {}..{})",
                self.disparity_min,
                self.disparity_max
            ));
        }
        if self.initial_rating < self.rating_floor {
            return Err(anyhow!(
                "Initial rating {} is below the rating floor {}",
                self.initial_rating,
                self.rating_floor
            ));
        }
        if self.new_player_bonus < 0 {
            return Err(anyhow!("New player bonus cannot be negative"));
        }
        if self.history_limit == 0 {
            return Err(anyhow!("History limit must be greater than 0"));
        }
        Ok(())
    }
}
