//! Rating-update engines
//!
//! These functions mutate a registry in place and never touch storage.
//! Persistence and locking live in [`crate::service`].

pub mod doubles;
pub mod history;
pub mod singles;

pub use doubles::process_doubles_match;
pub use history::append_match_history;
pub use singles::process_match;
