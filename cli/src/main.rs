use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use fluent_sqlite::{Database, DriverConfig, Query};
use fluent_sqlite_core::{
    Direction, FilterGroup, Limit, Model, OrderBy, QueryBuilder, Row, Statement, Value,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fluent-sqlite")]
#[command(about = "Run whitelisted select, update and insert statements against SQLite")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Select columns, or check existence when no columns are given.
    Select(SelectArgs),
    /// Update matching rows.
    Update(UpdateArgs),
    /// Insert one row of positional values.
    Insert(InsertArgs),
}

/// Which database and table a command targets.
#[derive(Debug, Args)]
struct TargetArgs {
    /// Path to the SQLite database file.
    #[arg(long, conflicts_with = "config", required_unless_present = "config")]
    db: Option<PathBuf>,
    /// Driver configuration YAML (database path, open mode, models).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Table to query.
    #[arg(long)]
    table: String,
    /// Comma-separated column whitelist; overrides the configured model.
    #[arg(long)]
    model: Option<String>,
    /// Print the rendered statement as JSON instead of running it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct SelectArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Comma-separated columns to select.
    #[arg(long)]
    columns: Option<String>,
    /// Filter group as a JSON object of column values; repeat to OR groups.
    #[arg(long = "where", value_name = "JSON")]
    filters: Vec<String>,
    /// Ordering as `column[:asc|desc]`; repeat for more columns.
    #[arg(long, value_name = "COLUMN[:DIR]")]
    order: Vec<String>,
    /// Maximum number of rows.
    #[arg(long)]
    limit: Option<u64>,
    /// Rows to skip before the limit applies.
    #[arg(long, requires = "limit")]
    offset: Option<u64>,
    /// Print only the first row of a non-empty result.
    #[arg(long)]
    flatten: bool,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Columns to set, as a JSON object.
    #[arg(long, value_name = "JSON")]
    set: String,
    /// Filter group as a JSON object of column values; repeat to OR groups.
    #[arg(long = "where", value_name = "JSON")]
    filters: Vec<String>,
}

#[derive(Debug, Args)]
struct InsertArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Row values in table column order, as a JSON array.
    #[arg(long, value_name = "JSON")]
    values: String,
}

/// Outcome of an update or insert.
#[derive(Debug, Serialize)]
struct WriteOutcome {
    changed: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Select(args) => run_select(args),
        Command::Update(args) => run_update(args),
        Command::Insert(args) => run_insert(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run_select(args: SelectArgs) -> Result<(), String> {
    let config = load_config(&args.target)?;
    let builder = base_builder(&args.target, config.as_ref())?
        .filter(parse_filters(&args.filters)?)
        .order_by(parse_order(&args.order)?)
        .flatten(args.flatten);
    let builder = match (args.limit, args.offset) {
        (Some(count), Some(offset)) => builder.limit(Limit::range(offset, count)),
        (Some(count), None) => builder.limit(Limit::Rows(count)),
        _ => builder,
    };
    let columns = parse_csv_list(args.columns);

    if args.target.dry_run {
        let statement = builder
            .select_statement(&columns)
            .map_err(|e| format!("Failed to render select: {e}"))?;
        return print_json(&statement);
    }

    let db = open_database(&args.target, config.as_ref())?;
    let selection = Query::from_builder(&db, builder)
        .select(&columns)
        .map_err(|e| format!("Select failed: {e}"))?;
    print_json(&selection)
}

fn run_update(args: UpdateArgs) -> Result<(), String> {
    let config = load_config(&args.target)?;
    let entity = Row::from_json(parse_json(&args.set, "--set")?)
        .map_err(|e| format!("Invalid --set: {e}"))?;
    let builder = base_builder(&args.target, config.as_ref())?.filter(parse_filters(&args.filters)?);

    if args.target.dry_run {
        let statement = builder
            .update_statement(&entity)
            .map_err(|e| format!("Failed to render update: {e}"))?;
        return print_json(&statement);
    }

    let db = open_database(&args.target, config.as_ref())?;
    let changed = Query::from_builder(&db, builder)
        .update(&entity)
        .map_err(|e| format!("Update failed: {e}"))?;
    print_json(&WriteOutcome { changed })
}

fn run_insert(args: InsertArgs) -> Result<(), String> {
    let config = load_config(&args.target)?;
    let values = parse_values(&args.values)?;
    let builder = base_builder(&args.target, config.as_ref())?;

    if args.target.dry_run {
        let statement: Statement = builder
            .insert_statement(&values)
            .map_err(|e| format!("Failed to render insert: {e}"))?;
        return print_json(&statement);
    }

    let db = open_database(&args.target, config.as_ref())?;
    let changed = Query::from_builder(&db, builder)
        .insert(&values)
        .map_err(|e| format!("Insert failed: {e}"))?;
    print_json(&WriteOutcome { changed })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(target: &TargetArgs) -> Result<Option<DriverConfig>, String> {
    target
        .config
        .as_ref()
        .map(|path| {
            DriverConfig::load(path)
                .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))
        })
        .transpose()
}

fn open_database(target: &TargetArgs, config: Option<&DriverConfig>) -> Result<Database, String> {
    match (config, &target.db) {
        (Some(config), _) => Database::from_config(config).map_err(|e| {
            format!(
                "Failed to open database '{}': {e}",
                config.database.display()
            )
        }),
        (None, Some(path)) => Database::open(path)
            .map_err(|e| format!("Failed to open database '{}': {e}", path.display())),
        (None, None) => Err("one of --db or --config is required".to_string()),
    }
}

/// Starts a builder on the target table with the effective model.
///
/// `--model` wins over the configured model for the table.
fn base_builder(target: &TargetArgs, config: Option<&DriverConfig>) -> Result<QueryBuilder, String> {
    if target.table.trim().is_empty() {
        return Err("--table must not be empty".to_string());
    }

    let model = match &target.model {
        Some(raw) => Some(Model::new(parse_csv_list(Some(raw.clone())))),
        None => config.and_then(|c| c.model_for(&target.table)).cloned(),
    };
    debug!(table = %target.table, model = ?model, "Configured query target");

    Ok(QueryBuilder::new().for_table(&target.table).with_model(model))
}

fn parse_json(raw: &str, flag: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("Invalid JSON for {flag}: {e}"))
}

fn parse_filters(raw: &[String]) -> Result<Vec<FilterGroup>, String> {
    raw.iter()
        .map(|group| {
            FilterGroup::from_json(parse_json(group, "--where")?)
                .map_err(|e| format!("Invalid --where: {e}"))
        })
        .collect()
}

fn parse_order(raw: &[String]) -> Result<OrderBy, String> {
    let mut order = OrderBy::new();
    for term in raw {
        let (column, direction) = match term.split_once(':') {
            Some((column, direction)) => (
                column,
                direction
                    .parse::<Direction>()
                    .map_err(|e| format!("Invalid --order '{term}': {e}"))?,
            ),
            None => (term.as_str(), Direction::Asc),
        };
        let column = column.trim();
        if column.is_empty() {
            return Err(format!("Invalid --order '{term}': missing column"));
        }
        order = order.then(column, direction);
    }
    Ok(order)
}

fn parse_values(raw: &str) -> Result<Vec<Value>, String> {
    match parse_json(raw, "--values")? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| Value::try_from(item).map_err(|e| format!("Invalid --values: {e}")))
            .collect(),
        other => Err(format!("Invalid --values: expected a JSON array, got {other}")),
    }
}

fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_defaults_to_ascending() {
        let order = parse_order(&["name".to_string(), "id:DESC".to_string()]).unwrap();
        let terms: Vec<_> = order.iter().collect();
        assert_eq!(terms, vec![("name", Direction::Asc), ("id", Direction::Desc)]);
    }

    #[test]
    fn test_parse_order_rejects_bad_direction() {
        assert!(parse_order(&["id:sideways".to_string()]).is_err());
        assert!(parse_order(&[":asc".to_string()]).is_err());
    }

    #[test]
    fn test_parse_values_requires_array() {
        let values = parse_values(r#"[1, "a", null, 2.5]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Integer(1),
                Value::Text("a".into()),
                Value::Null,
                Value::Real(2.5)
            ]
        );
        assert!(parse_values(r#"{"a": 1}"#).is_err());
        assert!(parse_values("not json").is_err());
    }

    #[test]
    fn test_parse_filters_each_argument_is_a_group() {
        let groups = parse_filters(&[r#"{"a": 1, "b": "x"}"#.to_string(), r#"{"c": 2}"#.to_string()])
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert!(parse_filters(&["[1]".to_string()]).is_err());
    }

    #[test]
    fn test_parse_csv_list_trims_and_skips_empty() {
        assert_eq!(
            parse_csv_list(Some(" id, name,,".to_string())),
            vec!["id".to_string(), "name".to_string()]
        );
        assert!(parse_csv_list(None).is_empty());
    }
}
