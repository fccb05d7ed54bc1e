//! Error types for statement composition.
//!
//! Every failure raised while configuring a builder or rendering a
//! statement is caller misuse: a missing table, a whitelist violation, or a
//! malformed descriptor. None of them are retryable.

use thiserror::Error;

/// Errors raised while configuring a query or rendering its statement.
///
/// These are detected before any SQL reaches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A terminal operation ran before a table name was set.
    #[error("no table name defined")]
    MissingTable,

    /// A model entry is not a plain column name.
    #[error("model key '{key}' must have a value of type string")]
    InvalidModelEntry {
        /// Index (array models) or key (object models) of the bad entry.
        key: String,
    },

    /// The model descriptor is neither a list nor a mapping of names.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// An update payload references a column outside the active model.
    #[error("column key '{column}' does not exist in table model")]
    ColumnNotInModel {
        /// The offending column name.
        column: String,
    },

    /// Insert value count differs from the active model's column count.
    #[error("values length {actual} does not match {expected} columns in model")]
    ValueCountMismatch {
        /// Number of columns in the model.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// An update was requested with no columns to set.
    #[error("update requires at least one column")]
    EmptyUpdate,

    /// An insert was requested with no values.
    #[error("insert requires at least one value")]
    EmptyInsert,

    /// An ordering direction other than `ASC` or `DESC`.
    #[error("invalid order direction: {0}")]
    InvalidDirection(String),

    /// A limit descriptor that is neither a count nor a single `offset: count` pair.
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    /// A filter group that is not a column-to-value mapping.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A JSON value with no SQLite representation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Convenience alias for results with [`ConfigurationError`].
pub type Result<T> = std::result::Result<T, ConfigurationError>;
