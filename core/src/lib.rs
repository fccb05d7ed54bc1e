//! Statement composition for fluent SQLite queries.
//!
//! This crate turns structured query descriptors into parameterized SQL.
//! It never touches a database; the `fluent-sqlite` crate executes what it
//! renders.
//!
//! - [`Value`]: the closed set of bindable SQLite primitives.
//! - [`Row`]: an ordered column-to-value mapping (result rows, update
//!   payloads).
//! - [`Model`]: a column whitelist restricting what a query may touch.
//! - [`FilterGroup`]: ANDed equality conditions; groups are ORed.
//! - [`OrderBy`] and [`Limit`]: ORDER BY and LIMIT descriptors.
//! - [`QueryBuilder`]: per-statement configuration that renders a
//!   [`Statement`].
//!
//! # Example
//!
//! ```
//! use fluent_sqlite_core::*;
//!
//! let builder = QueryBuilder::new()
//!     .for_table("users")
//!     .filter([
//!         FilterGroup::new().eq("role", "admin").eq("active", true),
//!         FilterGroup::new().eq("id", 1),
//!     ])
//!     .order_by(OrderBy::new().desc("id"))
//!     .limit(Limit::range(0, 10));
//!
//! let stmt = builder.select_statement(&["id", "name"]).unwrap();
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT id,name FROM users WHERE (role = ? AND active = ?) OR (id = ?) \
//!      ORDER BY id DESC LIMIT 0,10"
//! );
//! assert_eq!(stmt.values.len(), 3);
//! ```

mod builder;
mod clause;
mod error;
mod filter;
mod model;
mod value;

pub use builder::{QueryBuilder, Statement};
pub use clause::{Direction, Limit, OrderBy};
pub use error::{ConfigurationError, Result};
pub use filter::FilterGroup;
pub use model::Model;
pub use value::{Row, Value};
