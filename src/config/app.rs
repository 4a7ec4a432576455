//! Main application configuration
//!
//! This module defines the primary configuration structures for the ladder,
//! including environment variable loading, TOML files and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub rating: RatingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where each rating pool is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON registry for the singles pool
    pub singles_path: PathBuf,
    /// JSON registry for the doubles pool
    pub doubles_path: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "ladder-ledger".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            singles_path: PathBuf::from("data.json"),
            doubles_path: PathBuf::from("doubles_data.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Storage settings
        if let Ok(path) = env::var("LADDER_SINGLES_PATH") {
            self.storage.singles_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("LADDER_DOUBLES_PATH") {
            self.storage.doubles_path = PathBuf::from(path);
        }

        // Rating settings
        if let Ok(k) = env::var("LADDER_K_FACTOR") {
            self.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_K_FACTOR value: {}", k))?;
        }
        if let Ok(initial) = env::var("LADDER_INITIAL_RATING") {
            self.rating.initial_rating = initial
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_INITIAL_RATING value: {}", initial))?;
        }
        if let Ok(floor) = env::var("LADDER_RATING_FLOOR") {
            self.rating.rating_floor = floor
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_RATING_FLOOR value: {}", floor))?;
        }
        if let Ok(limit) = env::var("LADDER_HISTORY_LIMIT") {
            self.rating.history_limit = limit
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_HISTORY_LIMIT value: {}", limit))?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.storage.singles_path.as_os_str().is_empty() {
        return Err(anyhow!("Singles storage path cannot be empty"));
    }
    if config.storage.doubles_path.as_os_str().is_empty() {
        return Err(anyhow!("Doubles storage path cannot be empty"));
    }
    if config.storage.singles_path == config.storage.doubles_path {
        return Err(anyhow!(
            "Singles and doubles pools must use separate storage locations"
        ));
    }

    config.rating.validate()
}
