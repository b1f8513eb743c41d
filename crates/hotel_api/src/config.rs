//! Environment-driven configuration for the request router.
//!
//! # Invariants
//! - The process-wide config is resolved once; later env changes are ignored.
//! - Blank variables count as unset.

use hotel_core::{default_log_level, init_logging, LoggingError};
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DB_PATH_VAR: &str = "HOTEL_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "HOTEL_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "HOTEL_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "hotel_server.sqlite3";

static PROCESS_CONFIG: OnceLock<ApiConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// SQLite database file opened once per request.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl ApiConfig {
    /// Builds a config for an explicit database file with default logging.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }

    /// Reads `HOTEL_DB_PATH`, `HOTEL_LOG_LEVEL` and `HOTEL_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Returns the config resolved from the environment on first use.
    pub fn process() -> &'static ApiConfig {
        PROCESS_CONFIG.get_or_init(Self::from_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let db_path = value(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_level = value(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string());
        let log_dir = value(LOG_DIR_VAR).map(PathBuf::from);

        Self {
            db_path,
            log_level,
            log_dir,
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is disabled by configuration.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        init_logging(&self.log_level, &log_dir.to_string_lossy())?;
        Ok(true)
    }
}
