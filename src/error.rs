//! Error types for the rating ledger
//!
//! Library operations return [`LadderError`] so callers can tell a missing
//! player apart from a storage failure. The binary and configuration layer
//! wrap these in `anyhow` like the rest of the application code.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, LadderError>;

/// Recoverable failures reported to the caller. None are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Player not registered: {player_id}")]
    MissingParticipant { player_id: String },

    #[error("Storage unavailable at {location}: {source}")]
    StorageUnavailable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt storage at {location}: {source}")]
    CorruptStorage {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("Storage lock poisoned for {location}")]
    LockPoisoned { location: String },
}

impl LadderError {
    pub fn missing(player_id: &str) -> Self {
        Self::MissingParticipant {
            player_id: player_id.to_string(),
        }
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParticipant { .. } => "missing_participant",
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::CorruptStorage { .. } => "corrupt_storage",
            Self::InvalidMatch { .. } => "invalid_match",
            Self::LockPoisoned { .. } => "lock_poisoned",
        }
    }
}
