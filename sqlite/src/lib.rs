//! SQLite execution for fluent queries.
//!
//! This crate runs statements rendered by
//! [`fluent_sqlite_core::QueryBuilder`] against a SQLite database through
//! [`rusqlite`]. It adds a fluent [`Query`] handle bound to an executor, a
//! [`Database`] that applies per-table column models, and YAML
//! configuration for opening and bootstrapping a database file.
//!
//! # Architecture
//!
//! The crate is organized into five modules:
//!
//! - **`executor`**: The [`Executor`] trait and the rusqlite-backed [`Database`]
//! - **`query`**: Fluent [`Query`] composition and [`Selection`] results
//! - **`convert`**: Value conversion at the rusqlite boundary
//! - **`config`**: [`DriverConfig`] loading and saving
//! - **`error`**: The unified [`SqliteError`] type
//!
//! # Quick start
//!
//! ```
//! use fluent_sqlite::{Database, Selection};
//! use fluent_sqlite_core::{FilterGroup, Limit, Model, Row, Value};
//!
//! let db = Database::open_in_memory()
//!     .unwrap()
//!     .with_model("tasks", Model::new(["id", "title"]));
//! db.connection()
//!     .execute_batch("CREATE TABLE tasks (id INTEGER, title TEXT)")
//!     .unwrap();
//!
//! let tasks = db.table("tasks");
//! assert!(tasks.insert(&[Value::from(1), Value::from("write docs")]).unwrap());
//!
//! // The model has two columns, so a three-value insert never reaches SQLite.
//! assert!(tasks.insert(&[Value::from(2), Value::from("x"), Value::Null]).is_err());
//!
//! // `secret` is outside the model and silently dropped.
//! let rows = tasks
//!     .clone()
//!     .limit(Limit::Rows(10))
//!     .select(&["title", "secret"])
//!     .unwrap();
//! assert_eq!(rows, Selection::Rows(vec![Row::from([("title", "write docs")])]));
//!
//! let missing = tasks.filter([FilterGroup::from([("id", 2)])]);
//! assert!(!missing.exists().unwrap());
//! ```
//!
//! # Configuration
//!
//! ```no_run
//! use fluent_sqlite::{Database, DriverConfig};
//!
//! let config = DriverConfig::load("driver.yml").unwrap();
//! let db = Database::from_config(&config).unwrap();
//! ```

mod config;
mod convert;
mod error;
mod executor;
mod query;

pub use config::DriverConfig;
pub use error::{Result, SqliteError};
pub use executor::{Database, Executor};
pub use query::{Query, Selection};
