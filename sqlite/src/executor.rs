//! Statement execution against SQLite.
//!
//! [`Executor`] is the seam between query composition and the database:
//! it runs a rendered [`Statement`] and either collects its rows or reports
//! whether it matched anything. [`Database`] implements it over a
//! [`rusqlite::Connection`].
//!
//! Statements are prepared on every call; nothing is cached between calls.

use std::collections::HashMap;
use std::path::Path;

use fluent_sqlite_core::{Model, Row, Statement};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::config::DriverConfig;
use crate::convert;
use crate::error::{Result, SqliteError};
use crate::query::Query;

/// Runs rendered statements.
///
/// Implementations bind [`Statement::values`] positionally starting at
/// index 1 and never retry a failed statement.
pub trait Executor {
    /// Runs `statement` to completion and returns every row, keyed by the
    /// column names the statement reports.
    fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>>;

    /// Runs `statement` and reports whether it matched anything.
    ///
    /// For statements with a result shape this is "at least one row was
    /// produced"; for statements without one (UPDATE, INSERT) it is "at
    /// least one row changed".
    fn matched(&self, statement: &Statement) -> Result<bool>;
}

/// A SQLite database handle with optional per-table models.
///
/// # Examples
///
/// ```
/// use fluent_sqlite::{Database, Selection};
/// use fluent_sqlite_core::{FilterGroup, Row, Value};
///
/// let db = Database::open_in_memory().unwrap();
/// db.connection()
///     .execute_batch("CREATE TABLE users (id INTEGER, name TEXT)")
///     .unwrap();
///
/// let users = db.table("users");
/// assert!(users.insert(&[Value::from(1), Value::from("ada")]).unwrap());
///
/// let found = users
///     .clone()
///     .filter([FilterGroup::from([("id", 1)])])
///     .flatten(true)
///     .select(&["name"])
///     .unwrap();
/// assert_eq!(found, Selection::Row(Row::from([("name", "ada")])));
/// ```
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    models: HashMap<String, Model>,
}

impl Database {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened database");
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Wraps an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            models: HashMap::new(),
        }
    }

    /// Opens the database described by `config`.
    ///
    /// A database opened for writing must not be read-only on disk. When
    /// `init_sql` is set and the database holds no schema objects yet, the
    /// SQL file is executed in a single transaction. A failed bootstrap
    /// rolls back, so the next open retries it. Configured models are
    /// applied by [`table`](Self::table).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::NotWritable`] for a read-only file opened for
    /// writing, [`SqliteError::Io`] if `init_sql` cannot be read, and
    /// [`SqliteError::QueryExecution`] if opening or bootstrapping fails.
    pub fn from_config(config: &DriverConfig) -> Result<Self> {
        if config.database.exists() && !config.read_only {
            let metadata = std::fs::metadata(&config.database)?;
            if metadata.permissions().readonly() {
                return Err(SqliteError::NotWritable(config.database.clone()));
            }
        }

        // A missing bootstrap file must fail before anything is created.
        let bootstrap = match config.init_sql.as_ref().filter(|_| !config.read_only) {
            Some(path) => Some((path, std::fs::read_to_string(path)?)),
            None => None,
        };

        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if config.read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
            if config.create {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
        }

        let mut conn = Connection::open_with_flags(&config.database, flags)?;
        info!(
            path = %config.database.display(),
            read_only = config.read_only,
            "Opened database"
        );

        if let Some((path, sql)) = bootstrap {
            if schema_is_empty(&conn)? {
                let tx = conn.transaction()?;
                tx.execute_batch(&sql)?;
                tx.commit()?;
                info!(init_sql = %path.display(), "Bootstrapped database schema");
            } else {
                debug!(init_sql = %path.display(), "Schema present, skipping bootstrap");
            }
        }

        let mut database = Self::from_connection(conn);
        for (table, model) in &config.models {
            database = database.with_model(table.clone(), model.clone());
        }
        Ok(database)
    }

    /// Registers the model applied to queries on `table`.
    ///
    /// An empty model removes any registered one.
    pub fn with_model(mut self, table: impl Into<String>, model: Model) -> Self {
        let table = table.into();
        if model.is_empty() {
            self.models.remove(&table);
        } else {
            self.models.insert(table, model);
        }
        self
    }

    /// Starts a query on `table`, preloaded with its registered model.
    pub fn table(&self, table: &str) -> Query<'_, Self> {
        Query::new(self)
            .for_table(table)
            .with_model(self.models.get(table).cloned())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the database and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

fn schema_is_empty(conn: &Connection) -> Result<bool> {
    let objects: i64 = conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))?;
    Ok(objects == 0)
}

impl Executor for Database {
    fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>> {
        debug!(sql = %statement.sql, values = statement.values.len(), "Fetching rows");
        let mut stmt = self.conn.prepare(&statement.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(convert::params(&statement.values))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(convert::read_row(row, &columns)?);
        }
        Ok(out)
    }

    fn matched(&self, statement: &Statement) -> Result<bool> {
        debug!(sql = %statement.sql, values = statement.values.len(), "Executing statement");
        let mut stmt = self.conn.prepare(&statement.sql)?;

        if stmt.column_count() > 0 {
            let mut rows = stmt.query(convert::params(&statement.values))?;
            let found = rows.next()?.is_some();
            return Ok(found);
        }

        let changed = stmt.execute(convert::params(&statement.values))?;
        Ok(changed > 0)
    }
}
