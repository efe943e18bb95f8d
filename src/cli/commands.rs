//! CLI commands and argument parsing

use crate::pagination::IterationMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated list calls against AWS Omics
#[derive(Parser, Debug)]
#[command(name = "omics-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Operation catalog file (YAML) replacing the built-in catalog
    #[arg(long, global = true)]
    pub operations: Option<PathBuf>,

    /// Endpoint used for every operation
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// AWS region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Whether continuation tokens are followed
    #[arg(long, global = true)]
    pub iteration_mode: Option<IterationModeArg>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a list operation
    List {
        /// Operation name (e.g., ListRuns)
        operation: String,

        /// Operation parameter as name=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Page-size hint sent with every request
        #[arg(long, visible_alias = "max-results")]
        max_result: Option<u32>,

        /// Continuation token to start from; fetches a single page
        #[arg(long, visible_alias = "starting-token")]
        next_token: Option<String>,

        /// Fetch a single page
        #[arg(long)]
        no_auto_iteration: bool,

        /// Output selector: the items field, '*' or '^parameter'
        #[arg(short, long)]
        select: Option<String>,

        /// Emit the operation's pass-through parameter (deprecated, use --select ^name)
        #[arg(long)]
        pass_thru: bool,
    },

    /// List catalog operations
    Operations,

    /// Show an operation definition
    Describe {
        /// Operation name
        operation: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Iteration mode flag values
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IterationModeArg {
    /// Follow continuation tokens
    Auto,
    /// Fetch one page per call
    #[value(alias = "legacy")]
    SinglePage,
}

impl From<IterationModeArg> for IterationMode {
    fn from(arg: IterationModeArg) -> Self {
        match arg {
            IterationModeArg::Auto => Self::Auto,
            IterationModeArg::SinglePage => Self::SinglePage,
        }
    }
}

/// Parse `name=value`; the value may itself contain '='
fn parse_param(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
