//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::{SupridentError, SupridentResult};
use std::path::{Path, PathBuf};

/// Default SQLite database file when none is configured.
pub const DEFAULT_DATABASE_PATH: &str = "suprident.db";

/// Default root directory for stored delivery evidence.
pub const DEFAULT_STORAGE_DIR: &str = "storage";

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_path: PathBuf,
    storage_dir: PathBuf,
    session_ttl_hours: i64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        database_path: PathBuf,
        storage_dir: PathBuf,
        session_ttl_hours: i64,
    ) -> SupridentResult<Self> {
        if session_ttl_hours <= 0 {
            return Err(SupridentError::InvalidInput(
                "session_ttl_hours must be positive".into(),
            ));
        }

        Ok(Self {
            database_path,
            storage_dir,
            session_ttl_hours,
        })
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn session_ttl_hours(&self) -> i64 {
        self.session_ttl_hours
    }
}

/// Resolve the database path from an optional env-var value.
pub fn database_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

/// Resolve the storage directory from an optional env-var value.
pub fn storage_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
}

/// Parse the session TTL from an optional env-var value.
///
/// If `value` is `None` or empty/whitespace, returns the default TTL.
pub fn session_ttl_from_env_value(value: Option<String>) -> SupridentResult<i64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_SESSION_TTL_HOURS),
        Some(v) => v.parse::<i64>().map_err(|_| {
            SupridentError::InvalidInput(format!("invalid session TTL: {v:?}"))
        }),
    }
}
