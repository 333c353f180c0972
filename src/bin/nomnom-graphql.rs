//! nomnom-graphql CLI - GraphQL types from YAML record definitions
//!
//! Validates record definitions, prints the generated schema and runs list
//! queries against JSON data.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use nomnom_graphql::config::{load_records, SchemaConfig, DEFAULT_CONFIG_FILE};
use nomnom_graphql::query::AstValue;
use nomnom_graphql::resolve::Arguments;
use nomnom_graphql::{ObjectBuilder, QueryContext, Record, RecordDef, ResolveParams, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nomnom-graphql")]
#[command(version, about = "GraphQL object and interface generation from record definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate record definitions without building a schema
    Validate {
        /// Directory containing record YAML files
        #[arg(short, long, default_value = "records")]
        records: PathBuf,
    },

    /// Print the generated schema in SDL form
    Schema {
        /// Path to nomnom-graphql.yaml, used when present
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Directory containing record YAML files (overrides config file)
        #[arg(short, long)]
        records: Option<PathBuf>,

        /// Prefix for generated type names (overrides config file)
        #[arg(short, long, env = "NOMNOM_GRAPHQL_PREFIX")]
        prefix: Option<String>,
    },

    /// Resolve one list field of a JSON document, with optional filter and sort
    Query {
        /// Directory containing record YAML files
        #[arg(short, long, default_value = "records")]
        records: PathBuf,

        /// Record describing the JSON document
        #[arg(long)]
        record: String,

        /// JSON document to query
        #[arg(short, long)]
        data: PathBuf,

        /// List field to resolve, by GraphQL name
        #[arg(short, long)]
        field: String,

        /// Filter as JSON, e.g. '{"Field": "n", "Operation": "==", "Argument": {"Value": "a"}}'
        #[arg(long)]
        filter: Option<String>,

        /// Sort as JSON, e.g. '{"Field": "n", "Order": "DESC"}'
        #[arg(long)]
        sort: Option<String>,
    },
}

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { records } => validate_records(records),
        Commands::Schema { config, records, prefix } => print_schema(config, records, prefix),
        Commands::Query {
            records,
            record,
            data,
            field,
            filter,
            sort,
        } => run_query(records, record, data, field, filter, sort),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn validate_records(records: PathBuf) -> Result<(), String> {
    println!("🔍 Validating records in {}...", records.display());

    let defs = load_records(&records).map_err(|e| format!("Failed to load records: {}", e))?;
    println!("  ✓ {} records loaded", defs.len());

    let types = ObjectBuilder::new(defs, "", None)
        .and_then(|builder| builder.finish())
        .map_err(|e| format!("Failed to build types: {}", e))?;
    println!(
        "  ✓ {} object types, {} interfaces",
        types.all_objects().len(),
        types.interfaces.len()
    );

    println!("✅ All records are valid!");

    Ok(())
}

fn print_schema(config: PathBuf, records: Option<PathBuf>, prefix: Option<String>) -> Result<(), String> {
    let mut schema_config = if config.exists() {
        info!(config = %config.display(), "Loading schema configuration");
        SchemaConfig::load(&config).map_err(|e| format!("Failed to load config: {}", e))?
    } else {
        debug!(config = %config.display(), "No schema configuration, using defaults");
        SchemaConfig::default()
    };
    if let Some(records) = records {
        schema_config.records = records;
    }
    if let Some(prefix) = prefix {
        schema_config.name_prefix = Some(prefix);
    }

    let defs = load_records(&schema_config.records).map_err(|e| format!("Failed to load records: {}", e))?;
    let prefix = schema_config.name_prefix.unwrap_or_default();
    let types = ObjectBuilder::new(defs, &prefix, None)
        .and_then(|builder| builder.finish())
        .map_err(|e| format!("Failed to build types: {}", e))?;

    print!("{}", types);

    Ok(())
}

fn run_query(
    records: PathBuf,
    record: String,
    data: PathBuf,
    field: String,
    filter: Option<String>,
    sort: Option<String>,
) -> Result<(), String> {
    let defs = load_records(&records).map_err(|e| format!("Failed to load records: {}", e))?;
    let def: Arc<RecordDef> = defs
        .iter()
        .find(|d| d.name == record)
        .cloned()
        .map(Arc::new)
        .ok_or_else(|| format!("Record not found: {}", record))?;

    let content = fs::read_to_string(&data).map_err(|e| format!("Failed to read {}: {}", data.display(), e))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", data.display(), e))?;
    let source = Value::Record(Record::from_json(def.clone(), &json).map_err(|e| e.to_string())?);

    let types = ObjectBuilder::new(defs, "", None)
        .and_then(|builder| builder.finish())
        .map_err(|e| format!("Failed to build types: {}", e))?;
    let object = types
        .resolve_type(&source)
        .ok_or_else(|| format!("No object type for record {}", record))?;
    let gfield = object
        .field(&field)
        .ok_or_else(|| format!("Field {} not found on {}", field, object.name))?;

    let mut args = Arguments::new();
    for (name, raw) in [("filter", filter), ("sort", sort)] {
        if let Some(raw) = raw {
            let json: serde_json::Value =
                serde_json::from_str(&raw).map_err(|e| format!("Invalid {} JSON: {}", name, e))?;
            args.insert(name.to_string(), AstValue::from(&json));
        }
    }

    let context = QueryContext::new();
    let resolved = gfield
        .resolve(&ResolveParams::new(&source, &context, &args))
        .map_err(|e| e.to_string())?;

    let output = serde_json::to_string_pretty(&resolved).map_err(|e| e.to_string())?;
    println!("{}", output);

    Ok(())
}
