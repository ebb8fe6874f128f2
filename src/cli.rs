use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Compile per-property filter strings into predicates and apply them to JSON records
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Filter configuration file (JSON5: culture, ignore_parse_exceptions)
    #[arg(short, long, global = true, env = "ENTITY_FILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Culture for number and date parsing (invariant, en-US, en-GB, de-DE, fr-FR)
    #[arg(long, global = true)]
    pub culture: Option<String>,

    /// Drop filter values that fail to parse instead of failing
    #[arg(long, global = true)]
    pub ignore_parse_errors: bool,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Schema descriptor (JSON5) defining the entity types
    #[arg(short, long, env = "ENTITY_FILTER_SCHEMA")]
    pub schema: PathBuf,

    /// Entity type the filter is built for
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub entity_type: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Property filter as PROPERTY=SYNTAX, e.g. -f 'Age=>=18' (repeatable)
    #[arg(short = 'f', long = "filter", value_name = "PROPERTY=SYNTAX")]
    pub filters: Vec<String>,

    /// Derived-class filter as TYPE:PROPERTY=SYNTAX (repeatable)
    #[arg(long = "derived", value_name = "TYPE:PROPERTY=SYNTAX")]
    pub derived: Vec<String>,

    /// Subclass filter as TYPE:PROPERTY=SYNTAX (repeatable)
    #[arg(long = "subclass", value_name = "TYPE:PROPERTY=SYNTAX")]
    pub subclass: Vec<String>,

    /// Subclass filters apply to exactly their type, not to further derived types
    #[arg(long)]
    pub exact: bool,

    /// Re-target the filter onto another entity type before applying it
    #[arg(long, value_name = "TYPE")]
    pub cast: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a filter to a JSON array of records and print the matches
    Filter {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// JSON file holding an array of records; "$type" selects a record's runtime type
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Print the predicate a filter compiles to
    Explain {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List the filterable properties of an entity type
    Describe {
        #[command(flatten)]
        target: TargetArgs,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
