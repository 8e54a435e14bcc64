//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve database path and logging settings for FFI and CLI hosts.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never fails; every setting has a default or is optional.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKNEST_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKNEST_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKNEST_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "tasknest.sqlite3";

/// Resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the key-value slots.
    pub db_path: PathBuf,
    /// Level passed to `init_logging`.
    pub log_level: String,
    /// Log directory; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
