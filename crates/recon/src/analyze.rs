use crate::error::{ReconError, Result};
use crate::matcher::{matches, Threshold};
use crate::model::{AlignedPair, DiscrepancyEntry, Record, Side, Value};

fn field<'r>(record: &'r Record, side: Side, pair: &AlignedPair<'_>, column: &str) -> Result<&'r Value> {
    record.get(column).ok_or_else(|| ReconError::MissingField {
        side,
        record_id: pair.key.to_string(),
        column: column.to_string(),
    })
}

/// Compare `columns` of every aligned pair; one FieldMismatch per failing
/// (record, column), carrying the raw values. Pairs are visited in the order
/// given, columns in the order listed.
///
/// Columns are expected to be resolved against both schemas already. A record
/// that still lacks one of them aborts the analysis.
pub fn analyze(
    pairs: &[AlignedPair<'_>],
    columns: &[String],
    threshold: Threshold,
) -> Result<Vec<DiscrepancyEntry>> {
    let mut mismatches = Vec::new();

    for pair in pairs {
        for column in columns {
            let source_value = field(pair.source, Side::Source, pair, column)?;
            let target_value = field(pair.target, Side::Target, pair, column)?;

            if !matches(source_value, target_value, threshold) {
                mismatches.push(DiscrepancyEntry::FieldMismatch {
                    record_id: pair.key.clone(),
                    field: column.clone(),
                    source_value: source_value.clone(),
                    target_value: target_value.clone(),
                });
            }
        }
    }

    Ok(mismatches)
}
