//! Application configuration.
//!
//! Read from the JSON file named by `STUDYSYNC_CONFIG`, else from
//! `studysync.json` in the working directory, else built-in defaults.
//! Every field is optional in the file.

use crate::models::{SessionLimits, SrsPolicy};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "STUDYSYNC_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "studysync.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// Owner of the cards in the local store.
    pub user_id: String,
    pub srs: SrsPolicy,
    pub session: SessionLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("studysync.sqlite3"),
            user_id: "local".to_string(),
            srs: SrsPolicy::default(),
            session: SessionLimits::default(),
        }
    }
}

impl AppConfig {
    /// Resolves the config location and loads it.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => {
                info!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let srs = &self.srs;
        if !(srs.min_ease > 0.0 && srs.min_ease <= srs.initial_ease && srs.initial_ease <= srs.max_ease) {
            return Err(ConfigError::Invalid(format!(
                "ease factors must satisfy 0 < min ({}) <= initial ({}) <= max ({})",
                srs.min_ease, srs.initial_ease, srs.max_ease
            )));
        }
        if srs.failure_penalty < 0.0 || srs.hard_penalty < 0.0 || srs.easy_bonus < 0.0 {
            return Err(ConfigError::Invalid(
                "ease adjustments must not be negative".to_string(),
            ));
        }
        if srs.min_interval == 0 {
            return Err(ConfigError::Invalid("min_interval must be at least 1 day".to_string()));
        }

        let session = &self.session;
        if session.max_size == 0 || session.min_due > session.target_size || session.target_size > session.max_size {
            return Err(ConfigError::Invalid(format!(
                "session limits must satisfy min_due ({}) <= target_size ({}) <= max_size ({}), max_size > 0",
                session.min_due, session.target_size, session.max_size
            )));
        }
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::Invalid("user_id must not be empty".to_string()));
        }
        Ok(())
    }
}
