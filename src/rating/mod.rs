//! Rating model shared by the singles and doubles engines

pub mod calculator;

// Re-export commonly used types
pub use calculator::{expected_score, EloCalculator, RatingDelta};
