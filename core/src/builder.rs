//! Query configuration and statement rendering.
//!
//! [`QueryBuilder`] accumulates the table, model, filters, ordering, limit
//! and flatten flag for one logical statement. Rendering borrows the
//! builder, so the same configuration always yields the same SQL text and
//! bound values. [`QueryBuilder::reset`] clears per-statement state when a
//! builder is reused.
//!
//! # SQL surface
//!
//! ```text
//! SELECT <cols|NULL> FROM <table> [WHERE (c1 = ? AND c2 = ?) OR (c3 = ?)]
//!     [ORDER BY c1,c2 d1|d2] [LIMIT n | offset,count]
//! UPDATE <table> SET c1 = ?, c2 = ? [WHERE ...]
//! INSERT INTO <table> VALUES (?, ?, ...)
//! ```
//!
//! Only identifiers are interpolated into the SQL text. Identifiers are
//! trusted caller input; every value is bound.

use std::fmt;

use serde::Serialize;

use crate::clause::{Limit, OrderBy};
use crate::error::{ConfigurationError, Result};
use crate::filter::{Filter, FilterGroup, render_filter};
use crate::model::Model;
use crate::value::{Row, Value};

/// Rendered SQL text and its positional bound values.
///
/// # Examples
///
/// ```
/// use fluent_sqlite_core::{Statement, Value};
///
/// let stmt = Statement::new("SELECT * FROM users WHERE id = ?").bind(7);
/// assert_eq!(stmt.values, vec![Value::Integer(7)]);
/// assert_eq!(stmt.to_string(), "SELECT * FROM users WHERE id = ?");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statement {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub values: Vec<Value>,
}

impl Statement {
    /// Creates a statement with no bound values.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            values: Vec::new(),
        }
    }

    /// Appends one bound value.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Appends several bound values in order.
    pub fn bind_all<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Per-statement query configuration.
///
/// Configuration methods consume and return the builder for chaining.
/// Filters are resolved against the model active when
/// [`filter`](Self::filter) is called, so set the model first.
///
/// # Examples
///
/// ```
/// use fluent_sqlite_core::{FilterGroup, Limit, Model, QueryBuilder, Value};
///
/// let builder = QueryBuilder::new()
///     .for_table("users")
///     .with_model(Model::new(["id", "name"]))
///     .filter([FilterGroup::new().eq("id", 1).eq("secret", "x")])
///     .limit(Limit::Rows(5));
///
/// let stmt = builder.select_statement(&["name"]).unwrap();
/// assert_eq!(stmt.sql, "SELECT name FROM users WHERE (id = ?) LIMIT 5");
/// assert_eq!(stmt.values, vec![Value::Integer(1)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    table: Option<String>,
    model: Option<Model>,
    filter: Option<Filter>,
    order_by: Option<OrderBy>,
    limit: Option<Limit>,
    flatten: bool,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets `table`.
    pub fn for_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Sets or clears the column whitelist. An empty model clears it.
    pub fn with_model(mut self, model: impl Into<Option<Model>>) -> Self {
        self.model = model.into().filter(|m| !m.is_empty());
        self
    }

    /// Replaces the WHERE clause with `groups`.
    ///
    /// Groups are ORed and their conditions ANDed. Conditions on columns
    /// outside the active model are dropped one by one. When nothing
    /// survives the builder has no WHERE clause at all.
    pub fn filter<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = FilterGroup>,
    {
        let groups: Vec<FilterGroup> = groups.into_iter().collect();
        self.filter = render_filter(&groups, self.model.as_ref());
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Collapses non-empty data selections to their first row.
    pub fn flatten(mut self, flag: bool) -> Self {
        self.flatten = flag;
        self
    }

    /// Sets the ORDER BY clause. An empty ordering clears it.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order).filter(|o| !o.is_empty());
        self
    }

    /// Clears filters, ordering, limit and the flatten flag.
    ///
    /// The table and model are kept, since they describe the target rather
    /// than a single statement.
    pub fn reset(&mut self) {
        self.filter = None;
        self.order_by = None;
        self.limit = None;
        self.flatten = false;
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn is_flattened(&self) -> bool {
        self.flatten
    }

    /// Returns the requested columns that the active model permits.
    ///
    /// An empty result means the select renders as an existence check.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        let mut projected = Vec::with_capacity(columns.len());
        for column in columns {
            let column: &str = column.as_ref();
            if self.model.as_ref().is_none_or(|m| m.contains(column)) {
                projected.push(column.to_string());
            }
        }
        projected
    }

    /// Renders a SELECT for `columns` after applying the model.
    ///
    /// With no columns left the projection is the literal `NULL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingTable`] if no table is set.
    pub fn select_statement<S: AsRef<str>>(&self, columns: &[S]) -> Result<Statement> {
        let table = self.require_table()?;
        let columns = self.project(columns);
        let projection = if columns.is_empty() {
            "NULL".to_string()
        } else {
            columns.join(",")
        };

        let mut sql = format!("SELECT {projection} FROM {table}");
        let mut values = Vec::new();
        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.sql);
            values.extend(filter.values.iter().cloned());
        }
        if let Some(order) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {order}"));
        }
        if let Some(limit) = &self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        Ok(Statement { sql, values })
    }

    /// Renders an UPDATE setting `entity`'s columns, in order.
    ///
    /// Bound values are the entity values followed by the filter values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingTable`] without a table,
    /// [`ConfigurationError::ColumnNotInModel`] for a key outside the
    /// model, and [`ConfigurationError::EmptyUpdate`] for an empty entity.
    pub fn update_statement(&self, entity: &Row) -> Result<Statement> {
        let table = self.require_table()?;

        if let Some(model) = &self.model {
            if let Some(column) = entity.columns().find(|c| !model.contains(c)) {
                return Err(ConfigurationError::ColumnNotInModel {
                    column: column.to_string(),
                });
            }
        }
        if entity.is_empty() {
            return Err(ConfigurationError::EmptyUpdate);
        }

        let changes: Vec<String> = entity.columns().map(|c| format!("{c} = ?")).collect();
        let mut sql = format!("UPDATE {table} SET {}", changes.join(", "));
        let mut values: Vec<Value> = entity.values().cloned().collect();
        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.sql);
            values.extend(filter.values.iter().cloned());
        }

        Ok(Statement { sql, values })
    }

    /// Renders a positional INSERT with one placeholder per value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingTable`] without a table,
    /// [`ConfigurationError::ValueCountMismatch`] when a model is active
    /// and the value count differs from its width, and
    /// [`ConfigurationError::EmptyInsert`] for no values.
    pub fn insert_statement(&self, values: &[Value]) -> Result<Statement> {
        let table = self.require_table()?;

        if let Some(model) = self.model.as_ref().filter(|m| m.len() != values.len()) {
            return Err(ConfigurationError::ValueCountMismatch {
                expected: model.len(),
                actual: values.len(),
            });
        }
        if values.is_empty() {
            return Err(ConfigurationError::EmptyInsert);
        }

        let placeholders = vec!["?"; values.len()].join(", ");
        Ok(Statement {
            sql: format!("INSERT INTO {table} VALUES ({placeholders})"),
            values: values.to_vec(),
        })
    }

    fn require_table(&self) -> Result<&str> {
        self.table
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigurationError::MissingTable)
    }
}
