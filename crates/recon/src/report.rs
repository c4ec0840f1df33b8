use std::collections::HashSet;

use crate::model::{DiscrepancyEntry, RecordKey, ReconReport, ReportSummary};

/// Merge missing-record keys and field mismatches into one report.
///
/// Order: missing in target, missing in source, then field mismatches, each
/// group keeping the order it was given in.
pub fn assemble(
    missing_in_target: impl IntoIterator<Item = RecordKey>,
    missing_in_source: impl IntoIterator<Item = RecordKey>,
    field_mismatches: Vec<DiscrepancyEntry>,
) -> ReconReport {
    let mut entries: Vec<DiscrepancyEntry> = missing_in_target
        .into_iter()
        .map(|record_id| DiscrepancyEntry::MissingInTarget { record_id })
        .collect();
    entries.extend(
        missing_in_source
            .into_iter()
            .map(|record_id| DiscrepancyEntry::MissingInSource { record_id }),
    );
    entries.extend(field_mismatches);

    ReconReport {
        summary: compute_summary(&entries),
        entries,
        duplicate_keys: Vec::new(),
    }
}

/// Count entries per kind.
pub fn compute_summary(entries: &[DiscrepancyEntry]) -> ReportSummary {
    let mut summary = ReportSummary::default();
    let mut mismatched_records: HashSet<&RecordKey> = HashSet::new();

    for entry in entries {
        match entry {
            DiscrepancyEntry::MissingInTarget { .. } => summary.missing_in_target += 1,
            DiscrepancyEntry::MissingInSource { .. } => summary.missing_in_source += 1,
            DiscrepancyEntry::FieldMismatch { record_id, .. } => {
                summary.field_mismatches += 1;
                mismatched_records.insert(record_id);
            }
        }
    }

    summary.records_with_mismatches = mismatched_records.len();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryKind, Value};

    fn mismatch(id: i64, field: &str) -> DiscrepancyEntry {
        DiscrepancyEntry::FieldMismatch {
            record_id: RecordKey::single(id),
            field: field.into(),
            source_value: Value::from("a"),
            target_value: Value::from("b"),
        }
    }

    #[test]
    fn missing_first_then_mismatches() {
        let report = assemble(
            vec![RecordKey::single(1)],
            vec![RecordKey::single(4), RecordKey::single(5)],
            vec![mismatch(2, "Name"), mismatch(2, "Email"), mismatch(3, "Name")],
        );

        let kinds: Vec<EntryKind> = report.entries.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::MissingInTarget,
                EntryKind::MissingInSource,
                EntryKind::MissingInSource,
                EntryKind::FieldMismatch,
                EntryKind::FieldMismatch,
                EntryKind::FieldMismatch,
            ]
        );
        assert_eq!(report.summary.missing_in_target, 1);
        assert_eq!(report.summary.missing_in_source, 2);
        assert_eq!(report.summary.field_mismatches, 3);
        assert_eq!(report.summary.records_with_mismatches, 2);
        assert!(report.duplicate_keys.is_empty());
    }

    #[test]
    fn empty_inputs_give_empty_report() {
        let report = assemble(Vec::new(), Vec::new(), Vec::new());
        assert!(report.entries.is_empty());
        assert_eq!(report.summary, ReportSummary::default());
        assert!(report.summary.is_clean());
    }
}
