//! Tracker bootstrap configuration.
//!
//! # Responsibility
//! - Collect the knobs `Tracker::open` needs: database location, slot key
//!   and logging setup.
//! - Validate them before any file is touched.

use crate::logging::{default_log_level, normalize_level};
use crate::store::application_store::DEFAULT_STORAGE_KEY;
use crate::storage::validate_key;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Configuration for opening a `Tracker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// SQLite file path; `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    /// Slot key holding the application collection.
    pub storage_key: String,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` skips file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl TrackerConfig {
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Checks key shape, log level and log directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_key(&self.storage_key)
            .map_err(|_| ConfigError::InvalidStorageKey(self.storage_key.clone()))?;
        normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}

/// Invalid `TrackerConfig` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidStorageKey(String),
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStorageKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::InvalidLogLevel(level) => write!(f, "invalid log level `{level}`"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
        }
    }
}

impl Error for ConfigError {}
