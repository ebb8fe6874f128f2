pub mod cli;
pub mod config;
pub mod errors;
pub mod expression;
pub mod filter;
pub mod output;
pub mod record;
pub mod schema;
pub mod value;

pub use cli::{Commands, OutputFormat, cli_parse};
pub use config::{ConfigError, Culture, FilterConfiguration, default_configuration, load_config};
pub use errors::{FilterCreationError, FilterErrorReason};
pub use expression::{CompareOp, Expr, Operand};
pub use filter::{
    CompiledFilter, EntityFilter, FilterOperator, PropertyFilter, SubFilterKind, ValueFilter,
};
pub use record::{Entity, Record, RecordError};
pub use schema::{EntityType, EnumType, NumericType, PropertyType, Schema, SchemaError};
pub use value::Value;

use anyhow::{Context, Result, bail};
use cli::{FilterArgs, TargetArgs};
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use tracing::debug;

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_env_filter(filter)
        .try_init();
}

fn build_configuration(cli: &cli::Cli) -> Result<FilterConfiguration> {
    let mut configuration =
        load_config(cli.config.as_deref()).context("Failed to load filter configuration")?;
    if let Some(culture) = &cli.culture {
        configuration = configuration.with_culture(culture.parse()?);
    }
    if cli.ignore_parse_errors {
        configuration = configuration.with_ignore_parse_exceptions(true);
    }
    Ok(configuration)
}

/// Splits `PROPERTY=SYNTAX` at the first `=`.
fn split_assignment(spec: &str) -> Result<(&str, &str)> {
    match spec.split_once('=') {
        Some((property, syntax)) if !property.trim().is_empty() => {
            Ok((property.trim(), syntax))
        }
        _ => bail!("Expected PROPERTY=SYNTAX, got: {spec}"),
    }
}

/// Splits `TYPE:PROPERTY=SYNTAX`.
fn split_typed_assignment(spec: &str) -> Result<(&str, &str, &str)> {
    let (type_name, rest) = spec
        .split_once(':')
        .with_context(|| format!("Expected TYPE:PROPERTY=SYNTAX, got: {spec}"))?;
    let (property, syntax) = split_assignment(rest)?;
    Ok((type_name.trim(), property, syntax))
}

fn build_filter(
    schema: &Schema,
    entity_type: Arc<EntityType>,
    args: &FilterArgs,
    configuration: &Arc<FilterConfiguration>,
) -> Result<EntityFilter> {
    let mut filter = EntityFilter::with_configuration(entity_type, configuration.clone());
    for spec in &args.filters {
        let (property, syntax) = split_assignment(spec)?;
        filter
            .add(property, syntax)
            .with_context(|| format!("Invalid filter for '{property}': {syntax}"))?;
    }

    let mut derived: BTreeMap<&str, EntityFilter> = BTreeMap::new();
    let mut subclass: BTreeMap<&str, EntityFilter> = BTreeMap::new();
    for (specs, nested) in [(&args.derived, &mut derived), (&args.subclass, &mut subclass)] {
        for spec in specs {
            let (type_name, property, syntax) = split_typed_assignment(spec)?;
            let sub_type = schema.get(type_name)?;
            nested
                .entry(type_name)
                .or_insert_with(|| EntityFilter::with_configuration(sub_type, configuration.clone()))
                .add(property, syntax)
                .with_context(|| format!("Invalid filter for '{type_name}.{property}': {syntax}"))?;
        }
    }

    for (type_name, nested) in derived {
        filter
            .add_derived_class_filter(nested)
            .with_context(|| format!("Invalid derived-class filter for '{type_name}'"))?;
    }
    for (type_name, nested) in subclass {
        filter
            .add_subclass_filter(nested, !args.exact)
            .with_context(|| format!("Invalid subclass filter for '{type_name}'"))?;
    }

    if let Some(target) = &args.cast {
        let target_type = schema.get(target)?;
        let cast = filter.cast(target_type);
        debug!(
            kept = cast.property_filters().count(),
            dropped = filter.property_filters().count() - cast.property_filters().count(),
            "cast filter to '{target}'"
        );
        return Ok(cast);
    }
    Ok(filter)
}

fn load_target(target: &TargetArgs) -> Result<(Schema, Arc<EntityType>)> {
    let schema = Schema::load(&target.schema)?;
    let entity_type = schema.get(&target.entity_type)?;
    Ok((schema, entity_type))
}

fn load_records(schema: &Schema, entity_type: &Arc<EntityType>, path: &std::path::Path) -> Result<Vec<Record>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file '{}'", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse data file '{}'", path.display()))?;
    let items = json
        .as_array()
        .with_context(|| format!("Data file '{}' must hold a JSON array", path.display()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Record::from_json(schema, entity_type, item)
                .with_context(|| format!("Invalid record #{i} in '{}'", path.display()))
        })
        .collect()
}

pub fn run() -> Result<()> {
    let cli = cli_parse();
    init_logging(cli.verbose);
    let configuration = Arc::new(build_configuration(&cli)?);
    debug!(
        culture = configuration.culture().name(),
        ignore_parse_exceptions = configuration.ignore_parse_exceptions(),
        "filter configuration loaded"
    );

    match &cli.command {
        Commands::Filter {
            target,
            filter,
            data,
        } => {
            let (schema, entity_type) = load_target(target)?;
            let entity_filter = build_filter(&schema, entity_type, filter, &configuration)?;
            let compiled = entity_filter.compile()?;
            let records = load_records(&schema, compiled.entity_type(), data)?;
            let matches = compiled.filter(&records);

            match cli.format {
                OutputFormat::Text => print!(
                    "{}",
                    output::format_records_text(compiled.entity_type(), &matches, records.len())
                ),
                OutputFormat::Json => println!("{}", output::format_records_json(&matches)),
            }
        }
        Commands::Explain { target, filter } => {
            let (schema, entity_type) = load_target(target)?;
            let entity_filter = build_filter(&schema, entity_type, filter, &configuration)?;
            let compiled = entity_filter.compile()?;

            match cli.format {
                OutputFormat::Text => {
                    print!("{}", output::format_explain_text(&entity_filter, &compiled))
                }
                OutputFormat::Json => println!("{}", output::format_explain_json(&compiled)),
            }
        }
        Commands::Describe { target } => {
            let (_, entity_type) = load_target(target)?;
            match cli.format {
                OutputFormat::Text => print!("{}", output::format_describe_text(&entity_type)),
                OutputFormat::Json => println!("{}", output::format_describe_json(&entity_type)),
            }
        }
    }

    Ok(())
}
