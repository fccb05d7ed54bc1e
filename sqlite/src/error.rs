//! Error types for query execution.
//!
//! Provides a unified error type covering caller misuse detected while
//! rendering, statement preparation and execution failures, and
//! configuration loading.

use std::path::PathBuf;

use fluent_sqlite_core::ConfigurationError;
use thiserror::Error;

/// Errors that can occur while building or running a query.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Caller misuse caught before any SQL ran (missing table, whitelist
    /// violation, shape mismatch).
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Statement preparation or execution failure reported by SQLite.
    #[error("query execution error: {0}")]
    QueryExecution(#[from] rusqlite::Error),

    /// File I/O failure (config file, bootstrap SQL).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The database file exists but is read-only on disk.
    #[error("database file '{}' is not writable", .0.display())]
    NotWritable(PathBuf),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
