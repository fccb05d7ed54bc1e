//! Conversion between [`Value`]/[`Row`] and rusqlite types.
//!
//! Values cross the driver boundary here and nowhere else: bound values are
//! turned into owned [`rusqlite::types::Value`]s, and fetched cells are read
//! through [`ValueRef`] so no column type is assumed up front.

use fluent_sqlite_core::{Row, Value};
use rusqlite::ParamsFromIter;
use rusqlite::types::{self, ValueRef};

/// Converts a bound [`Value`] into its rusqlite representation.
pub(crate) fn to_sql_value(value: &Value) -> types::Value {
    match value {
        Value::Null => types::Value::Null,
        Value::Integer(v) => types::Value::Integer(*v),
        Value::Real(v) => types::Value::Real(*v),
        Value::Text(v) => types::Value::Text(v.clone()),
        Value::Blob(v) => types::Value::Blob(v.clone()),
    }
}

/// Converts a fetched cell into a [`Value`].
///
/// Text that is not valid UTF-8 is decoded lossily rather than failing the
/// whole fetch.
pub(crate) fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

/// Positional parameters for `values`, bound from index 1.
pub(crate) fn params(values: &[Value]) -> ParamsFromIter<Vec<types::Value>> {
    rusqlite::params_from_iter(values.iter().map(to_sql_value).collect::<Vec<_>>())
}

/// Reads every column of `row` into a [`Row`] keyed by `columns`.
///
/// Duplicate column names resolve last-write-wins.
pub(crate) fn read_row(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Row> {
    let mut out = Row::new();
    for (index, column) in columns.iter().enumerate() {
        out.insert(column.as_str(), from_sql_value(row.get_ref(index)?));
    }
    Ok(out)
}
