// ⚙️ Configuration - where the database lives and how loudly we log
// Precedence: explicit value (CLI flag) > environment > default

use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE: &str = "employees.db";
pub const DEFAULT_LOG_FILTER: &str = "esms=info";
pub const VERBOSE_LOG_FILTER: &str = "esms=debug";
pub const LOG_FILE: &str = "esms.log";

pub const DB_PATH_ENV: &str = "ESMS_DB_PATH";
pub const LOG_ENV: &str = "ESMS_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database file
    pub db_path: PathBuf,

    /// tracing-subscriber filter directive (RUST_LOG still wins when set)
    pub log_filter: String,
}

impl Config {
    /// Build from an optional explicit database path, falling back to the environment.
    /// `.env` should already be loaded by the caller.
    pub fn resolve(db_path: Option<PathBuf>, verbose: bool) -> Self {
        let db_path = db_path
            .or_else(|| {
                std::env::var(DB_PATH_ENV)
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));

        let log_filter = if verbose {
            VERBOSE_LOG_FILTER.to_string()
        } else {
            std::env::var(LOG_ENV)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
        };

        Config { db_path, log_filter }
    }

    /// Log file used by the terminal UI, next to the database
    pub fn log_path(&self) -> PathBuf {
        sibling(&self.db_path, LOG_FILE)
    }
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
