//! Report rendering: CSV table or pretty JSON.

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use tally_recon::config::OutputFormat;
use tally_recon::{DiscrepancyEntry, ReconReport};

use crate::CliError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => Self::Csv,
            OutputFormat::Json => Self::Json,
        }
    }
}

pub const CSV_HEADER: [&str; 5] =
    ["Type", "Record Identifier", "Field", "Source Value", "Target Value"];

pub fn render(report: &ReconReport, format: ReportFormat) -> Result<Vec<u8>, CliError> {
    match format {
        ReportFormat::Csv => format_report_csv(report),
        ReportFormat::Json => format_report_json(report),
    }
}

/// One row per entry. Columns that do not apply to an entry are blank.
fn format_report_csv(report: &ReconReport) -> Result<Vec<u8>, CliError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(|e| CliError::io(e.to_string()))?;

    for entry in &report.entries {
        let label = entry.kind().label();
        let id = entry.record_id().to_string();
        match entry {
            DiscrepancyEntry::MissingInTarget { .. } | DiscrepancyEntry::MissingInSource { .. } => {
                writer
                    .write_record([label, id.as_str(), "", "", ""])
                    .map_err(|e| CliError::io(e.to_string()))?;
            }
            DiscrepancyEntry::FieldMismatch { field, source_value, target_value, .. } => {
                let source = source_value.to_string();
                let target = target_value.to_string();
                writer
                    .write_record([label, id.as_str(), field.as_str(), source.as_str(), target.as_str()])
                    .map_err(|e| CliError::io(e.to_string()))?;
            }
        }
    }

    writer.into_inner().map_err(|e| CliError::io(e.to_string()))
}

fn format_report_json(report: &ReconReport) -> Result<Vec<u8>, CliError> {
    let mut bytes = serde_json::to_vec_pretty(report)
        .map_err(|e| CliError::new(crate::exit_codes::EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write rendered bytes to `dest`, or to stdout when `dest` is absent or `-`.
pub fn write_output(bytes: &[u8], dest: Option<&Path>) -> Result<(), CliError> {
    match dest {
        Some(path) if path != Path::new("-") => std::fs::write(path, bytes)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display()))),
        _ => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(bytes)
                .and_then(|_| lock.flush())
                .map_err(|e| CliError::io(format!("cannot write to stdout: {e}")))
        }
    }
}

/// Where a report went, for the completion message.
pub fn describe_destination(dest: Option<&Path>) -> String {
    match dest {
        Some(path) if path != Path::new("-") => path.display().to_string(),
        _ => "stdout".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_recon::report::assemble;
    use tally_recon::{RecordKey, Value};

    fn sample() -> ReconReport {
        assemble(
            vec![RecordKey::single(1)],
            vec![RecordKey(vec![Value::from(6), Value::from("b")])],
            vec![
                DiscrepancyEntry::FieldMismatch {
                    record_id: RecordKey::single(3),
                    field: "Name".into(),
                    source_value: Value::from("Carol"),
                    target_value: Value::from("Caroline, Jr."),
                },
                DiscrepancyEntry::FieldMismatch {
                    record_id: RecordKey::single(4),
                    field: "City".into(),
                    source_value: Value::Null,
                    target_value: Value::from(2.5),
                },
            ],
        )
    }

    #[test]
    fn csv_layout() {
        let bytes = render(&sample(), ReportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Type,Record Identifier,Field,Source Value,Target Value",
                "Missing in Target,1,,,",
                "Missing in Source,6|b,,,",
                "Field Discrepancy,3,Name,Carol,\"Caroline, Jr.\"",
                "Field Discrepancy,4,City,,2.5",
            ]
        );
    }

    #[test]
    fn csv_for_clean_report_is_header_only() {
        let report = assemble(Vec::new(), Vec::new(), Vec::new());
        let text = String::from_utf8(render(&report, ReportFormat::Csv).unwrap()).unwrap();
        assert_eq!(text, "Type,Record Identifier,Field,Source Value,Target Value\n");
    }

    #[test]
    fn json_carries_summary_and_entries() {
        let bytes = render(&sample(), ReportFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["summary"]["missing_in_target"], 1);
        assert_eq!(v["summary"]["field_mismatches"], 2);
        assert_eq!(v["entries"][0]["type"], "missing_in_target");
        assert_eq!(v["entries"][1]["record_id"], "6|b");
        assert_eq!(v["entries"][2]["source_value"], "Carol");
        assert!(v["entries"][3]["source_value"].is_null());
        assert!(v.get("duplicate_keys").is_none());
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_output(b"abc", Some(path.as_path())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc");
        assert_eq!(describe_destination(Some(path.as_path())), path.display().to_string());
        assert_eq!(describe_destination(Some(Path::new("-"))), "stdout");
        assert_eq!(describe_destination(None), "stdout");
    }

    #[test]
    fn unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("report.csv");
        let err = write_output(b"abc", Some(path.as_path())).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_IO);
    }
}
