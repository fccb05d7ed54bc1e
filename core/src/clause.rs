//! ORDER BY and LIMIT descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Sort direction for one ORDER BY column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

impl FromStr for Direction {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(ConfigurationError::InvalidDirection(s.to_string())),
        }
    }
}

/// An ordered column-to-direction mapping.
///
/// Rendered as the column list (comma-joined) followed by the direction
/// list (pipe-joined): `a,b ASC|DESC`. This only forms valid SQL for a
/// single column (`name DESC`); with several columns the direction list is
/// not a sort term and SQLite rejects the statement at prepare time. The
/// encoding is kept as-is for compatibility with existing callers.
///
/// # Examples
///
/// ```
/// use fluent_sqlite_core::OrderBy;
///
/// let order = OrderBy::new().asc("name").desc("age");
/// assert_eq!(order.to_string(), "name,age ASC|DESC");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    terms: Vec<(String, Direction)>,
}

impl OrderBy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends (or re-points) `column` with `direction`.
    pub fn then(mut self, column: impl Into<String>, direction: Direction) -> Self {
        let column = column.into();
        match self.terms.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = direction,
            None => self.terms.push((column, direction)),
        }
        self
    }

    pub fn asc(self, column: impl Into<String>) -> Self {
        self.then(column, Direction::Asc)
    }

    pub fn desc(self, column: impl Into<String>) -> Self {
        self.then(column, Direction::Desc)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.terms.iter().map(|(c, d)| (c.as_str(), *d))
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<&str> = self.terms.iter().map(|(c, _)| c.as_str()).collect();
        let directions: Vec<String> = self.terms.iter().map(|(_, d)| d.to_string()).collect();
        write!(f, "{} {}", columns.join(","), directions.join("|"))
    }
}

impl<K: Into<String>> FromIterator<(K, Direction)> for OrderBy {
    fn from_iter<I: IntoIterator<Item = (K, Direction)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(OrderBy::new(), |order, (c, d)| order.then(c, d))
    }
}

/// Row cap for a SELECT.
///
/// # Examples
///
/// ```
/// use fluent_sqlite_core::Limit;
///
/// assert_eq!(Limit::Rows(5).to_string(), "5");
/// assert_eq!(Limit::range(10, 20).to_string(), "10,20");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most `n` rows.
    Rows(u64),
    /// Skip `offset` rows, then return at most `count`.
    Range { offset: u64, count: u64 },
}

impl Limit {
    pub fn range(offset: u64, count: u64) -> Self {
        Limit::Range { offset, count }
    }

    /// Parses a limit from a JSON integer or a one-entry `{"offset": count}` object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidLimit`] for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use fluent_sqlite_core::Limit;
    /// use serde_json::json;
    ///
    /// assert_eq!(Limit::from_json(&json!(5)).unwrap(), Limit::Rows(5));
    /// assert_eq!(Limit::from_json(&json!({"10": 20})).unwrap(), Limit::range(10, 20));
    /// assert!(Limit::from_json(&json!({"1": 2, "3": 4})).is_err());
    /// ```
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let invalid = || ConfigurationError::InvalidLimit(json.to_string());
        match json {
            serde_json::Value::Number(n) => n.as_u64().map(Limit::Rows).ok_or_else(invalid),
            serde_json::Value::Object(map) if map.len() == 1 => {
                let (offset, count) = map.iter().next().ok_or_else(invalid)?;
                let offset = offset.trim().parse::<u64>().map_err(|_| invalid())?;
                let count = count.as_u64().ok_or_else(invalid)?;
                Ok(Limit::range(offset, count))
            }
            _ => Err(invalid()),
        }
    }
}

impl From<u64> for Limit {
    fn from(rows: u64) -> Self {
        Limit::Rows(rows)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Limit::range(offset, count)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Rows(rows) => write!(f, "{rows}"),
            Limit::Range { offset, count } => write!(f, "{offset},{count}"),
        }
    }
}
