//! Runtime configuration for the task list core.
//!
//! Values come from defaults overridden by `TASKLIST_*` environment
//! variables. Blank variables count as unset.

use crate::logging::default_log_level;
use crate::viewmodel::tasks_view_model::DEFAULT_STOP_GRACE;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "TASKLIST_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKLIST_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKLIST_LOG_DIR";
pub const STOP_GRACE_MS_ENV: &str = "TASKLIST_STOP_GRACE_MS";

const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    InvalidStopGrace { value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStopGrace { value } => write!(
                f,
                "{STOP_GRACE_MS_ENV} must be a whole number of milliseconds, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the `tasks` table.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off unless a directory is configured.
    pub log_dir: Option<PathBuf>,
    /// Grace window before an unobserved list subscription stops.
    pub stop_grace: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            stop_grace: DEFAULT_STOP_GRACE,
        }
    }
}

impl CoreConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, keyed by environment variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let mut config = Self::default();
        if let Some(db_path) = value(DB_PATH_ENV) {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = value(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config.log_dir = value(LOG_DIR_ENV).map(PathBuf::from);
        if let Some(raw) = value(STOP_GRACE_MS_ENV) {
            let millis = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidStopGrace { value: raw })?;
            config.stop_grace = Duration::from_millis(millis);
        }
        Ok(config)
    }
}
