//! Runtime settings resolved from the command line and environment.

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "bank_ledger=info";

/// Log filter used with `--verbose` when `RUST_LOG` is not set.
pub const VERBOSE_LOG_FILTER: &str = "bank_ledger=debug,sqlx=warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the SQLite database file
    pub database_path: String,

    /// Default `tracing` filter directive
    pub log_filter: String,
}

impl Config {
    pub fn new(database_path: impl Into<String>, verbose: bool) -> Self {
        let log_filter = if verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        };
        Self {
            database_path: database_path.into(),
            log_filter: log_filter.to_string(),
        }
    }

    /// URL of an existing database.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database_path)
    }

    /// URL that creates the database file when missing.
    pub fn database_url_create(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database_path)
    }
}
