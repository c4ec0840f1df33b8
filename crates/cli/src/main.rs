mod exit_codes;
mod logging;
mod output;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_IO, EXIT_SUCCESS};
use logging::{init_tracing, level_for, LogFormat};
use recon::{DiffArgs, RunArgs};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Reconcile two tabular datasets by key")]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Log line format (stderr)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text, env = "TALLY_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two CSV files and report missing records and field discrepancies
    #[command(after_help = "\
Examples:
  tally diff legacy.csv warehouse.csv
  tally diff legacy.csv warehouse.csv --columns Name,Email --threshold 0.85
  tally diff orders-a.tsv orders-b.tsv --key order_id,line --delimiter $'\\t'
  tally diff legacy.csv warehouse.csv -o report.csv
  tally diff legacy.csv warehouse.csv --format json --fail-on-discrepancy

Exit codes:
  0  completed (discrepancies are reported, not failures)
  2  usage error (e.g. key column also listed in --columns)
  3  discrepancies found (only with --fail-on-discrepancy)
  4  invalid configuration (missing column, bad threshold)
  5  input parse error
  6  I/O error")]
    Diff(DiffArgs),

    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  tally run customers.recon.toml
  tally run customers.recon.toml --format json -o -
  tally run customers.recon.toml --fail-on-discrepancy")]
    Run(RunArgs),

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  tally validate customers.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_format, level_for(cli.verbose));

    let result = match cli.command {
        Commands::Diff(args) => recon::cmd_diff(args),
        Commands::Run(args) => recon::cmd_run(args),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }
}
