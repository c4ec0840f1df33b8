//! `tally diff` / `tally run` / `tally validate`.

use std::path::{Path, PathBuf};

use clap::Args;
use tally_recon::config::{delimiter_byte, DatasetConfig, ReconConfig};
use tally_recon::loader::{load_csv_file, LoadOptions};
use tally_recon::{ComparisonSpec, Dataset, ReconError, ReconReport, Threshold};
use tracing::info;

use crate::exit_codes::{recon_exit_code, EXIT_DISCREPANCIES, EXIT_INVALID_CONFIG, EXIT_IO};
use crate::output::{describe_destination, render, write_output, ReportFormat};
use crate::CliError;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Source (reference) CSV file
    pub source: PathBuf,

    /// Target CSV file to check against the source
    pub target: PathBuf,

    /// Key column(s) identifying a record (comma-separated or repeated)
    #[arg(long, short = 'k', value_delimiter = ',', default_value = "ID")]
    pub key: Vec<String>,

    /// Columns to compare (comma-separated or repeated; default: all non-key columns)
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Similarity threshold in (0, 1]; 1.0 means exact match after normalization
    #[arg(long, short = 't', default_value_t = Threshold::DEFAULT.value())]
    pub threshold: f64,

    /// Write the report to a file instead of stdout ("-" for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, short = 'f', value_enum, default_value_t = ReportFormat::Csv)]
    pub format: ReportFormat,

    /// Field delimiter of both input files
    #[arg(long, short = 'd', default_value_t = ',')]
    pub delimiter: char,

    /// Exit with code 3 when any discrepancy is found
    #[arg(long)]
    pub fail_on_discrepancy: bool,

    /// Suppress the completion summary
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the .recon.toml config file
    pub config: PathBuf,

    /// Write the report here, overriding [output] file ("-" for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Report format, overriding [output] format
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<ReportFormat>,

    /// Exit with code 3 when any discrepancy is found
    #[arg(long)]
    pub fail_on_discrepancy: bool,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Map a library error, keeping its exit code and adding a hint where one helps.
fn from_recon(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::KeyColumnCompared(_) => {
            Some("remove the key column from --columns; keys are matched, not compared".to_string())
        }
        ReconError::MissingKeyColumn { .. } => {
            Some("use --key to name the identifier column (column names are case-sensitive)".to_string())
        }
        ReconError::InvalidThreshold(_) => Some("use a value such as 0.9 or 1.0".to_string()),
        _ => None,
    };
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint }
}

/// What to reconcile and where the report goes.
struct Job {
    spec: ComparisonSpec,
    source: PathBuf,
    target: PathBuf,
    source_options: LoadOptions,
    target_options: LoadOptions,
    format: ReportFormat,
    output: Option<PathBuf>,
    fail_on_discrepancy: bool,
    quiet: bool,
}

pub fn cmd_diff(args: DiffArgs) -> Result<(), CliError> {
    let threshold = Threshold::new(args.threshold).map_err(from_recon)?;
    let columns = Some(args.columns).filter(|c| !c.is_empty());
    let spec = ComparisonSpec::new(args.key, columns, threshold).map_err(from_recon)?;
    let options = LoadOptions { delimiter: delimiter_byte(args.delimiter).map_err(from_recon)? };

    execute(Job {
        spec,
        source: args.source,
        target: args.target,
        source_options: options,
        target_options: options,
        format: args.format,
        output: args.output,
        fail_on_discrepancy: args.fail_on_discrepancy,
        quiet: args.quiet,
    })
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;

    // Resolve file paths relative to config file's directory
    let base_dir = args.config.parent().unwrap_or_else(|| Path::new("."));

    let spec = config.comparison_spec().map_err(config_err)?;
    let output = args
        .output
        .or_else(|| config.output.file.as_ref().map(|f| base_dir.join(f)));
    let format = args.format.unwrap_or_else(|| config.output.format.into());

    info!(name = %config.name, "running reconciliation from config");

    execute(Job {
        spec,
        source: base_dir.join(&config.source.file),
        target: base_dir.join(&config.target.file),
        source_options: load_options(&config.source)?,
        target_options: load_options(&config.target)?,
        format,
        output,
        fail_on_discrepancy: args.fail_on_discrepancy,
        quiet: false,
    })
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let keys = config.compare.key_columns.join(", ");
    let columns = match &config.compare.columns {
        Some(cols) if !cols.is_empty() => cols.join(", "),
        _ => "all non-key columns".to_string(),
    };
    eprintln!(
        "valid: '{}' compares {} against {} by [{}] on {} at threshold {}",
        config.name,
        config.source.file,
        config.target.file,
        keys,
        columns,
        config.compare.threshold,
    );
    Ok(())
}

/// Config-file problems are configuration errors regardless of which check failed.
fn config_err(err: ReconError) -> CliError {
    recon_err(EXIT_INVALID_CONFIG, err.to_string())
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| recon_err(EXIT_IO, format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&config_str).map_err(config_err)
}

fn load_options(ds: &DatasetConfig) -> Result<LoadOptions, CliError> {
    Ok(LoadOptions { delimiter: delimiter_byte(ds.delimiter).map_err(config_err)? })
}

fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset, CliError> {
    load_csv_file(path, options).map_err(|e| {
        let code = recon_exit_code(&e);
        recon_err(code, format!("{}: {e}", path.display()))
    })
}

fn execute(job: Job) -> Result<(), CliError> {
    let source = load_dataset(&job.source, &job.source_options)?;
    let target = load_dataset(&job.target, &job.target_options)?;

    let report = tally_recon::run(&job.spec, &source, &target).map_err(from_recon)?;

    // Render fully before touching the destination so a failure writes nothing
    let bytes = render(&report, job.format)?;
    write_output(&bytes, job.output.as_deref())?;

    if !job.quiet {
        log_completion(&report, &describe_destination(job.output.as_deref()));
    }

    if job.fail_on_discrepancy && !report.summary.is_clean() {
        return Err(recon_err(
            EXIT_DISCREPANCIES,
            format!("{} discrepancies found", report.summary.total()),
        ));
    }

    Ok(())
}

fn log_completion(report: &ReconReport, destination: &str) {
    let s = &report.summary;
    info!(
        missing_in_target = s.missing_in_target,
        missing_in_source = s.missing_in_source,
        field_mismatches = s.field_mismatches,
        duplicate_keys = report.duplicate_keys.len(),
        report = destination,
        "reconciliation complete: {} missing in target, {} missing in source, {} field discrepancies; report saved to {}",
        s.missing_in_target,
        s.missing_in_source,
        s.field_mismatches,
        destination,
    );
}
