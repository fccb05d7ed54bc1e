//! Fluent queries bound to an executor.
//!
//! A [`Query`] pairs a [`QueryBuilder`] with a borrowed [`Executor`].
//! Configuration methods chain; the terminal operations
//! ([`select`](Query::select), [`update`](Query::update),
//! [`insert`](Query::insert)) render a statement and dispatch it. Terminal
//! operations borrow the query, so running one twice with the same
//! configuration sends identical SQL and values.
//!
//! # Example
//!
//! ```
//! use fluent_sqlite::{Database, Selection};
//! use fluent_sqlite_core::{FilterGroup, Model, OrderBy, Row};
//!
//! let db = Database::open_in_memory().unwrap();
//! db.connection()
//!     .execute_batch(
//!         "CREATE TABLE users (id INTEGER, name TEXT, role TEXT);
//!          INSERT INTO users VALUES (1, 'ada', 'admin'), (2, 'grace', 'user');",
//!     )
//!     .unwrap();
//!
//! let admins = db
//!     .table("users")
//!     .with_model(Model::new(["id", "name", "role"]))
//!     .filter([FilterGroup::from([("role", "admin")])]);
//!
//! assert!(admins.exists().unwrap());
//! assert!(admins.update(&Row::from([("name", "lovelace")])).unwrap());
//!
//! let names = admins
//!     .order_by(OrderBy::new().asc("id"))
//!     .select(&["name"])
//!     .unwrap();
//! assert_eq!(names, Selection::Rows(vec![Row::from([("name", "lovelace")])]));
//! ```

use fluent_sqlite_core::{FilterGroup, Limit, Model, OrderBy, QueryBuilder, Row, Statement, Value};
use serde::Serialize;

use crate::error::Result;
use crate::executor::Executor;

/// The result of [`Query::select`].
///
/// Serializes untagged: a boolean, an array of row objects, or a single
/// row object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    /// No columns were selected; whether any row matched.
    Exists(bool),
    /// Every matching row, in result order.
    Rows(Vec<Row>),
    /// The first matching row of a flattened, non-empty selection.
    Row(Row),
}

impl Selection {
    /// Returns `true` if the selection matched at least one row.
    pub fn exists(&self) -> bool {
        match self {
            Selection::Exists(found) => *found,
            Selection::Rows(rows) => !rows.is_empty(),
            Selection::Row(_) => true,
        }
    }

    /// Returns the first row, if any data was selected.
    pub fn first(&self) -> Option<&Row> {
        match self {
            Selection::Exists(_) => None,
            Selection::Rows(rows) => rows.first(),
            Selection::Row(row) => Some(row),
        }
    }

    /// Converts the selection into a list of rows.
    ///
    /// Existence checks carry no data and yield an empty list.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Selection::Exists(_) => Vec::new(),
            Selection::Rows(rows) => rows,
            Selection::Row(row) => vec![row],
        }
    }
}

/// A query under construction against an [`Executor`].
pub struct Query<'a, E: Executor + ?Sized> {
    executor: &'a E,
    builder: QueryBuilder,
}

impl<E: Executor + ?Sized> Clone for Query<'_, E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor,
            builder: self.builder.clone(),
        }
    }
}

impl<'a, E: Executor + ?Sized> Query<'a, E> {
    /// Creates an unconfigured query over `executor`.
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            builder: QueryBuilder::new(),
        }
    }

    /// Binds an already configured builder to `executor`.
    pub fn from_builder(executor: &'a E, builder: QueryBuilder) -> Self {
        Self { executor, builder }
    }

    pub fn for_table(mut self, table: impl Into<String>) -> Self {
        self.builder = self.builder.for_table(table);
        self
    }

    /// Sets or clears the column whitelist.
    pub fn with_model(mut self, model: impl Into<Option<Model>>) -> Self {
        self.builder = self.builder.with_model(model);
        self
    }

    /// Replaces the WHERE clause; see [`QueryBuilder::filter`].
    pub fn filter<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = FilterGroup>,
    {
        self.builder = self.builder.filter(groups);
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.builder = self.builder.limit(limit);
        self
    }

    pub fn flatten(mut self, flag: bool) -> Self {
        self.builder = self.builder.flatten(flag);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.builder = self.builder.order_by(order);
        self
    }

    /// Clears filters, ordering, limit and flatten; keeps table and model.
    pub fn reset(&mut self) {
        self.builder.reset();
    }

    /// The accumulated configuration.
    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Selects `columns` from the table.
    ///
    /// Columns outside the model are dropped first. With no columns left
    /// the query runs as `SELECT NULL ...` and yields
    /// [`Selection::Exists`]. Otherwise every row is returned, or only the
    /// first when flatten is set and at least one row matched.
    ///
    /// # Errors
    ///
    /// Returns [`Configuration`](crate::SqliteError::Configuration) without
    /// a table, or [`QueryExecution`](crate::SqliteError::QueryExecution)
    /// if SQLite rejects the statement.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Selection> {
        let columns = self.builder.project(columns);
        let statement = self.builder.select_statement(&columns)?;

        if columns.is_empty() {
            return Ok(Selection::Exists(self.executor.matched(&statement)?));
        }

        let mut rows = self.executor.fetch_all(&statement)?;
        if self.builder.is_flattened() && !rows.is_empty() {
            return Ok(Selection::Row(rows.swap_remove(0)));
        }
        Ok(Selection::Rows(rows))
    }

    /// Returns whether any row matches the current filters.
    pub fn exists(&self) -> Result<bool> {
        let statement = self.builder.select_statement::<&str>(&[])?;
        self.executor.matched(&statement)
    }

    /// Sets `entity`'s columns on every matching row.
    ///
    /// Returns whether any row changed. Nothing is sent to the database if
    /// the entity fails validation.
    ///
    /// # Errors
    ///
    /// Returns [`Configuration`](crate::SqliteError::Configuration) for a
    /// missing table, an empty entity, or a column outside the model.
    pub fn update(&self, entity: &Row) -> Result<bool> {
        let statement = self.builder.update_statement(entity)?;
        self.executor.matched(&statement)
    }

    /// Inserts one row of positional `values`.
    ///
    /// Returns whether a row was written. Nothing is sent to the database if
    /// the values fail validation.
    ///
    /// # Errors
    ///
    /// Returns [`Configuration`](crate::SqliteError::Configuration) for a
    /// missing table, no values, or a width that differs from the model.
    pub fn insert(&self, values: &[Value]) -> Result<bool> {
        let statement = self.builder.insert_statement(values)?;
        self.executor.matched(&statement)
    }

    /// Renders the SELECT that [`select`](Self::select) would run.
    pub fn select_statement<S: AsRef<str>>(&self, columns: &[S]) -> Result<Statement> {
        Ok(self.builder.select_statement(columns)?)
    }

    /// Renders the UPDATE that [`update`](Self::update) would run.
    pub fn update_statement(&self, entity: &Row) -> Result<Statement> {
        Ok(self.builder.update_statement(entity)?)
    }

    /// Renders the INSERT that [`insert`](Self::insert) would run.
    pub fn insert_statement(&self, values: &[Value]) -> Result<Statement> {
        Ok(self.builder.insert_statement(values)?)
    }
}
