//! Database configuration loaded from YAML.
//!
//! Describes which file to open, how to open it, an optional bootstrap SQL
//! file, and per-table column models applied by
//! [`Database::table`](crate::Database::table).
//!
//! # Example YAML
//!
//! ```yaml
//! database: app.db
//! read_only: false
//! create: true
//! init_sql: schema.sql
//! models:
//!   users: [id, name, email]
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use fluent_sqlite_core::Model;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How to open a database and which models to apply.
///
/// # Examples
///
/// ```
/// use fluent_sqlite::DriverConfig;
///
/// let config: DriverConfig = serde_yaml::from_str(
///     "database: app.db\nmodels:\n  users: [id, name]\n",
/// )
/// .unwrap();
/// assert!(!config.read_only);
/// assert!(config.create);
/// assert_eq!(config.model_for("users").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path to the SQLite database file.
    pub database: PathBuf,
    /// Open the database read-only.
    #[serde(default)]
    pub read_only: bool,
    /// Create the file when it does not exist.
    #[serde(default = "default_create")]
    pub create: bool,
    /// SQL file executed once, right after the database file is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_sql: Option<PathBuf>,
    /// Column whitelists keyed by table name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, Model>,
}

fn default_create() -> bool {
    true
}

impl DriverConfig {
    /// Creates a writable configuration for `database` with no models.
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            read_only: false,
            create: default_create(),
            init_sql: None,
            models: BTreeMap::new(),
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// Relative `database` and `init_sql` paths are resolved against the
    /// directory containing the config file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SqliteError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::SqliteError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: DriverConfig = serde_yaml::from_reader(reader)?;

        if let Some(base) = path.parent() {
            config.database = resolve(base, &config.database);
            config.init_sql = config.init_sql.map(|p| resolve(base, &p));
        }
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SqliteError::Io) if the file cannot be written,
    /// or [`Yaml`](crate::SqliteError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Registers a model for `table`, builder style.
    pub fn with_model(mut self, table: impl Into<String>, model: Model) -> Self {
        self.models.insert(table.into(), model);
        self
    }

    /// Returns the non-empty model configured for `table`.
    pub fn model_for(&self, table: &str) -> Option<&Model> {
        self.models.get(table).filter(|m| !m.is_empty())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() && !base.as_os_str().is_empty() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}
