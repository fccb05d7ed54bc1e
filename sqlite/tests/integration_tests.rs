//! Integration tests for the fluent-sqlite crate.

use fluent_sqlite::{Database, DriverConfig, Selection, SqliteError};
use fluent_sqlite_core::{
    ConfigurationError, Direction, FilterGroup, Limit, Model, OrderBy, Row, Value,
};

/// Creates an in-memory database with a populated `items` table.
fn items_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.connection()
        .execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT, qty INTEGER, note TEXT);
             INSERT INTO items VALUES (1, 'bolt', 10, 'a');
             INSERT INTO items VALUES (2, 'nut', 7, 'b');
             INSERT INTO items VALUES (3, 'screw', 7, NULL);
             INSERT INTO items VALUES (4, 'washer', 0, 'c');",
        )
        .unwrap();
    db
}

fn single_value_db(x: i64) -> Database {
    let db = Database::open_in_memory().unwrap();
    db.connection()
        .execute_batch("CREATE TABLE t (x INTEGER)")
        .unwrap();
    db.connection()
        .execute("INSERT INTO t VALUES (?1)", [x])
        .unwrap();
    db
}

#[test]
fn test_existence_select_true_and_false() {
    let db = items_db();
    let hit = db.table("items").filter([FilterGroup::from([("id", 1)])]);
    assert_eq!(hit.select::<&str>(&[]).unwrap(), Selection::Exists(true));

    let miss = db.table("items").filter([FilterGroup::new().eq("id", 2).eq("name", "bolt")]);
    assert_eq!(miss.select::<&str>(&[]).unwrap(), Selection::Exists(false));
}

#[test]
fn test_flatten_single_row() {
    let db = single_value_db(7);
    let query = db.table("t");

    assert_eq!(
        query.clone().flatten(true).select(&["x"]).unwrap(),
        Selection::Row(Row::from([("x", 7)]))
    );
    assert_eq!(
        query.select(&["x"]).unwrap(),
        Selection::Rows(vec![Row::from([("x", 7)])])
    );
}

#[test]
fn test_flatten_empty_result_is_empty_list() {
    let db = single_value_db(7);
    let selection = db
        .table("t")
        .filter([FilterGroup::from([("x", 8)])])
        .flatten(true)
        .select(&["x"])
        .unwrap();
    assert_eq!(selection, Selection::Rows(Vec::new()));
    assert_eq!(serde_json::to_string(&selection).unwrap(), "[]");
}

#[test]
fn test_or_of_and_groups() {
    let db = items_db();
    let rows = db
        .table("items")
        .filter([
            FilterGroup::new().eq("qty", 7).eq("name", "nut"),
            FilterGroup::new().eq("id", 4),
        ])
        .order_by(OrderBy::new().asc("id"))
        .select(&["id"])
        .unwrap()
        .into_rows();

    let ids: Vec<_> = rows.iter().filter_map(|r| r.get("id")).cloned().collect();
    assert_eq!(ids, vec![Value::Integer(2), Value::Integer(4)]);
}

#[test]
fn test_empty_groups_are_ignored() {
    let db = items_db();
    let rows = db
        .table("items")
        .filter([FilterGroup::new(), FilterGroup::new()])
        .select(&["id"])
        .unwrap();
    assert_eq!(rows.into_rows().len(), 4);
}

#[test]
fn test_model_drops_unknown_filter_and_select_columns() {
    let db = items_db().with_model("items", Model::new(["id", "name"]));
    let rows = db
        .table("items")
        .filter([FilterGroup::from([("qty", 0)])])
        .order_by(OrderBy::new().asc("id"))
        .select(&["name", "note"])
        .unwrap()
        .into_rows();

    // The qty condition was dropped, so every row matches.
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], Row::from([("name", "bolt")]));
}

#[test]
fn test_select_only_unknown_columns_checks_existence() {
    let db = items_db().with_model("items", Model::new(["id"]));
    let selection = db.table("items").select(&["note"]).unwrap();
    assert_eq!(selection, Selection::Exists(true));
}

#[test]
fn test_limit_and_offset() {
    let db = items_db();
    let query = db.table("items").order_by(OrderBy::new().asc("id"));

    let first_two = query.clone().limit(Limit::Rows(2)).select(&["id"]).unwrap();
    assert_eq!(first_two.into_rows().len(), 2);

    let page = query
        .limit(Limit::range(1, 2))
        .select(&["id"])
        .unwrap()
        .into_rows();
    assert_eq!(
        page,
        vec![Row::from([("id", 2)]), Row::from([("id", 3)])]
    );
}

#[test]
fn test_order_by_single_column_descending() {
    let db = items_db();
    let first = db
        .table("items")
        .order_by(OrderBy::new().desc("qty"))
        .flatten(true)
        .select(&["name"])
        .unwrap();
    assert_eq!(first, Selection::Row(Row::from([("name", "bolt")])));
}

#[test]
fn test_order_by_multiple_columns_is_rejected_by_sqlite() {
    let db = items_db();
    let order: OrderBy = [("qty", Direction::Asc), ("id", Direction::Desc)]
        .into_iter()
        .collect();
    let err = db
        .table("items")
        .order_by(order)
        .select(&["id"])
        .unwrap_err();
    assert!(matches!(err, SqliteError::QueryExecution(_)));
}

#[test]
fn test_insert_width_must_match_model() {
    let db = single_value_db(1).with_model("t", Model::new(["x", "y"]));
    let err = db
        .table("t")
        .insert(&[Value::from(1), Value::from(2), Value::from(3)])
        .unwrap_err();
    assert!(matches!(
        err,
        SqliteError::Configuration(ConfigurationError::ValueCountMismatch {
            expected: 2,
            actual: 3
        })
    ));
}

#[test]
fn test_insert_then_select() {
    let db = items_db();
    let items = db.table("items");
    assert!(items
        .insert(&[
            Value::from(5),
            Value::from("rivet"),
            Value::from(3),
            Value::Null
        ])
        .unwrap());

    let row = items
        .filter([FilterGroup::from([("id", 5)])])
        .flatten(true)
        .select(&["name", "note"])
        .unwrap();
    assert_eq!(
        row,
        Selection::Row(Row::from([
            ("name", Value::from("rivet")),
            ("note", Value::Null)
        ]))
    );
}

#[test]
fn test_update_outside_model_is_rejected() {
    let db = items_db().with_model("items", Model::new(["b"]));
    let err = db
        .table("items")
        .update(&Row::from([("a", 1)]))
        .unwrap_err();
    assert!(matches!(
        err,
        SqliteError::Configuration(ConfigurationError::ColumnNotInModel { .. })
    ));
}

#[test]
fn test_update_reports_changes() {
    let db = items_db();
    let nuts = db.table("items").filter([FilterGroup::from([("name", "nut")])]);
    assert!(nuts.update(&Row::from([("qty", 99)])).unwrap());

    let qty = nuts.clone().flatten(true).select(&["qty"]).unwrap();
    assert_eq!(qty, Selection::Row(Row::from([("qty", 99)])));

    let nobody = db.table("items").filter([FilterGroup::from([("name", "gear")])]);
    assert!(!nobody.update(&Row::from([("qty", 1)])).unwrap());
}

#[test]
fn test_missing_table_is_configuration_error() {
    let db = items_db();
    let err = fluent_sqlite::Query::new(&db).select(&["id"]).unwrap_err();
    assert!(matches!(
        err,
        SqliteError::Configuration(ConfigurationError::MissingTable)
    ));
}

#[test]
fn test_unknown_table_is_execution_error() {
    let db = items_db();
    let err = db.table("nowhere").select(&["id"]).unwrap_err();
    assert!(matches!(err, SqliteError::QueryExecution(_)));
}

#[test]
fn test_repeated_select_is_idempotent() {
    let db = items_db();
    let query = db
        .table("items")
        .filter([FilterGroup::from([("qty", 7)])])
        .order_by(OrderBy::new().asc("id"));

    let first = query.select(&["id", "name"]).unwrap();
    let second = query.select(&["id", "name"]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.into_rows().len(), 2);
}

#[test]
fn test_reset_reuses_table_and_model() {
    let db = items_db().with_model("items", Model::new(["id"]));
    let mut query = db
        .table("items")
        .filter([FilterGroup::from([("id", 1)])])
        .limit(Limit::Rows(1));
    assert_eq!(query.select(&["id"]).unwrap().into_rows().len(), 1);

    query.reset();
    assert_eq!(query.builder().table(), Some("items"));
    assert_eq!(query.select(&["id", "name"]).unwrap().into_rows().len(), 4);
}

#[test]
fn test_from_config_bootstraps_new_database() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("schema.sql"),
        "CREATE TABLE users (id INTEGER, name TEXT, email TEXT);
         INSERT INTO users VALUES (1, 'ada', 'ada@example.com');",
    )
    .unwrap();
    let config_path = dir.path().join("driver.yml");
    std::fs::write(
        &config_path,
        "database: app.db\ninit_sql: schema.sql\nmodels:\n  users: [id, name]\n",
    )
    .unwrap();

    let config = DriverConfig::load(&config_path).unwrap();
    let db = Database::from_config(&config).unwrap();
    assert!(dir.path().join("app.db").exists());

    let row = db
        .table("users")
        .flatten(true)
        .select(&["name", "email"])
        .unwrap();
    assert_eq!(row, Selection::Row(Row::from([("name", "ada")])));
    drop(db);

    // Reopening an existing file does not replay the bootstrap SQL.
    let db = Database::from_config(&config).unwrap();
    let rows = db.table("users").select(&["id"]).unwrap().into_rows();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_failed_bootstrap_is_retried_on_next_open() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema.sql");
    let db_path = dir.path().join("app.db");
    let config = DriverConfig {
        init_sql: Some(schema.clone()),
        ..DriverConfig::new(&db_path)
    };

    // Missing bootstrap file: nothing is created.
    let err = Database::from_config(&config).unwrap_err();
    assert!(matches!(err, SqliteError::Io(_)));
    assert!(!db_path.exists());

    // Broken SQL: the transaction rolls back and leaves no schema.
    std::fs::write(&schema, "CREATE TABLE users (id INTEGER); NOT SQL;").unwrap();
    let err = Database::from_config(&config).unwrap_err();
    assert!(matches!(err, SqliteError::QueryExecution(_)));

    std::fs::write(
        &schema,
        "CREATE TABLE users (id INTEGER); INSERT INTO users VALUES (1);",
    )
    .unwrap();
    let db = Database::from_config(&config).unwrap();
    assert!(db.table("users").exists().unwrap());
}

#[test]
fn test_uri_database_bootstraps_once() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema.sql");
    std::fs::write(&schema, "CREATE TABLE users (id INTEGER);").unwrap();
    let uri = format!("file:{}", dir.path().join("app.db").display());
    let config = DriverConfig {
        init_sql: Some(schema),
        ..DriverConfig::new(uri)
    };

    drop(Database::from_config(&config).unwrap());
    // A replayed CREATE TABLE would fail here.
    let db = Database::from_config(&config).unwrap();
    assert!(!db.table("users").exists().unwrap());
    assert!(dir.path().join("app.db").exists());
}

#[test]
fn test_bootstrap_skipped_when_schema_exists() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema.sql");
    std::fs::write(&schema, "CREATE TABLE users (id INTEGER);").unwrap();
    let db_path = dir.path().join("app.db");
    {
        let db = Database::open(&db_path).unwrap();
        db.connection()
            .execute_batch("CREATE TABLE other (x INTEGER)")
            .unwrap();
    }

    let config = DriverConfig {
        init_sql: Some(schema),
        ..DriverConfig::new(&db_path)
    };
    let db = Database::from_config(&config).unwrap();
    let err = db.table("users").exists().unwrap_err();
    assert!(matches!(err, SqliteError::QueryExecution(_)));
}

#[test]
fn test_from_config_read_only_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ro.db");
    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1);")
            .unwrap();
    }

    let mut config = DriverConfig::new(&path);
    config.read_only = true;
    let db = Database::from_config(&config).unwrap();

    assert!(db.table("t").exists().unwrap());
    let err = db.table("t").insert(&[Value::from(2)]).unwrap_err();
    assert!(matches!(err, SqliteError::QueryExecution(_)));
}

#[test]
fn test_from_config_without_create_requires_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DriverConfig::new(dir.path().join("missing.db"));
    config.create = false;

    let err = Database::from_config(&config).unwrap_err();
    assert!(matches!(err, SqliteError::QueryExecution(_)));
}

#[cfg(unix)]
#[test]
fn test_from_config_rejects_read_only_file_for_writing() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.db");
    {
        let db = Database::open(&path).unwrap();
        db.connection().execute_batch("CREATE TABLE t (x INTEGER)").unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

    let err = Database::from_config(&DriverConfig::new(&path)).unwrap_err();
    assert!(matches!(err, SqliteError::NotWritable(p) if p == path));
}
