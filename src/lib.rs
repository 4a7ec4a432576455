//! Ladder Ledger - Elo ratings for 1v1 and 2v2 ladders
//!
//! This crate keeps per-player rating registries for a singles and a doubles
//! pool, applies match results with a disparity-scaled Elo model, and
//! persists each registry atomically as JSON.

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod registry;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use rating::{expected_score, EloCalculator};
pub use registry::{Registration, Registry, RegistryStore};
pub use service::{DoublesPool, Ladder, RatingPool, SinglesPool};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
