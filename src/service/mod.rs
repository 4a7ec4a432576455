//! Service layer for the rating ledger
//!
//! This module binds the engines to storage: per-location locking, the
//! load-mutate-save cycle, and wiring both pools from configuration.

pub mod app;
pub mod lock;
pub mod pool;

pub use app::Ladder;
pub use pool::{DoublesPool, RatingPool, SinglesPool};
