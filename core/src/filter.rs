//! WHERE clause composition.
//!
//! Filters are an ordered list of [`FilterGroup`]s. Conditions inside a
//! group are ANDed, groups are ORed, and every value is bound through a
//! `?` placeholder in emission order.

use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::model::Model;
use crate::value::Value;

/// A set of equality conditions that must all hold.
///
/// Setting the same column twice keeps the first position and the last
/// value, like a mapping.
///
/// # Examples
///
/// ```
/// use fluent_sqlite_core::FilterGroup;
///
/// let group = FilterGroup::new().eq("status", "active").eq("age", 30);
/// assert_eq!(group.len(), 2);
///
/// let same = FilterGroup::from([("status", "active")]);
/// assert_eq!(same.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup {
    conditions: Vec<(String, Value)>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `column = ?` condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.conditions.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.conditions.push((column, value)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `(column, value)` conditions in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Parses a group from a JSON object of `column: value` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidFilter`] if `json` is not an
    /// object, or [`ConfigurationError::InvalidValue`] for unbindable values.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(ConfigurationError::InvalidFilter(format!(
                "expected an object of column values, got {json}"
            )));
        };

        let mut group = FilterGroup::new();
        for (column, value) in map {
            group = group.eq(column, Value::try_from(value)?);
        }
        Ok(group)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterGroup {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FilterGroup::new(), |group, (c, v)| group.eq(c, v))
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for FilterGroup {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// A rendered WHERE body and the values it binds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Filter {
    pub(crate) sql: String,
    pub(crate) values: Vec<Value>,
}

/// Renders filter groups, dropping conditions on columns outside `model`.
///
/// Returns `None` when no condition survives, so no WHERE clause is emitted.
pub(crate) fn render_filter(groups: &[FilterGroup], model: Option<&Model>) -> Option<Filter> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    for group in groups {
        let mut conditions = Vec::with_capacity(group.len());
        for (column, value) in group.iter() {
            if model.is_some_and(|m| !m.contains(column)) {
                debug!(column, "Dropping filter condition outside table model");
                continue;
            }
            conditions.push(format!("{column} = ?"));
            values.push(value.clone());
        }

        if !conditions.is_empty() {
            clauses.push(format!("({})", conditions.join(" AND ")));
        }
    }

    if clauses.is_empty() {
        return None;
    }

    Some(Filter {
        sql: clauses.join(" OR "),
        values,
    })
}
