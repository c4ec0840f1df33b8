use tracing::{debug, warn};

use crate::align::align;
use crate::analyze::analyze;
use crate::config::ComparisonSpec;
use crate::differ::{check_key_columns, diff_keys, duplicate_keys};
use crate::error::Result;
use crate::model::{Dataset, ReconReport, Side};
use crate::report::assemble;

/// Reconcile `source` against `target`.
///
/// All configuration checks (key columns, comparison columns) run before any
/// comparison; on error no report is produced.
pub fn run(spec: &ComparisonSpec, source: &Dataset, target: &Dataset) -> Result<ReconReport> {
    let keys = spec.key_columns();

    check_key_columns(source, Side::Source, keys)?;
    check_key_columns(target, Side::Target, keys)?;
    let columns = spec.resolve_columns(source, target)?;

    debug!(
        source_rows = source.len(),
        target_rows = target.len(),
        keys = ?keys,
        columns = ?columns,
        threshold = %spec.threshold(),
        "starting reconciliation"
    );

    let mut duplicates = duplicate_keys(source, Side::Source, keys)?;
    duplicates.extend(duplicate_keys(target, Side::Target, keys)?);
    for dup in &duplicates {
        warn!(
            side = %dup.side,
            key = %dup.key,
            count = dup.count,
            "duplicate key; first occurrence is compared"
        );
    }

    let diff = diff_keys(source, target, keys)?;
    let pairs = align(source, target, keys)?;
    debug!(aligned = pairs.len(), "aligned common records");

    let mismatches = analyze(&pairs, &columns, spec.threshold())?;

    let mut report = assemble(diff.missing_in_target, diff.missing_in_source, mismatches);
    report.duplicate_keys = duplicates;

    debug!(
        missing_in_target = report.summary.missing_in_target,
        missing_in_source = report.summary.missing_in_source,
        field_mismatches = report.summary.field_mismatches,
        "reconciliation finished"
    );

    Ok(report)
}
