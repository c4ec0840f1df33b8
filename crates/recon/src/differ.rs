use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ReconError, Result};
use crate::model::{Dataset, DuplicateKey, KeyDiff, Record, RecordKey, Side};

/// Check that every key column is part of the dataset's schema.
pub fn check_key_columns(dataset: &Dataset, side: Side, key_columns: &[String]) -> Result<()> {
    if key_columns.is_empty() {
        return Err(ReconError::ConfigValidation(
            "at least one key column is required".into(),
        ));
    }
    for column in key_columns {
        if !dataset.has_column(column) {
            return Err(ReconError::MissingKeyColumn {
                side,
                column: column.clone(),
            });
        }
    }
    Ok(())
}

/// Extract the key of every record, in file order. Key values are taken in
/// [`Value::key_form`](crate::model::Value::key_form), so numerically equal keys join.
pub(crate) fn keyed_records<'a>(
    dataset: &'a Dataset,
    side: Side,
    key_columns: &[String],
) -> Result<Vec<(RecordKey, &'a Record)>> {
    check_key_columns(dataset, side, key_columns)?;

    dataset
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let mut parts = Vec::with_capacity(key_columns.len());
            for column in key_columns {
                let value = record.get(column).ok_or_else(|| ReconError::MissingField {
                    side,
                    record_id: format!("row {}", row + 1),
                    column: column.clone(),
                })?;
                parts.push(value.key_form());
            }
            Ok((RecordKey(parts), record))
        })
        .collect()
}

fn key_set(dataset: &Dataset, side: Side, key_columns: &[String]) -> Result<BTreeSet<RecordKey>> {
    Ok(keyed_records(dataset, side, key_columns)?
        .into_iter()
        .map(|(key, _)| key)
        .collect())
}

/// Keys present on one side only. Duplicate keys collapse (set semantics).
pub fn diff_keys(source: &Dataset, target: &Dataset, key_columns: &[String]) -> Result<KeyDiff> {
    let source_keys = key_set(source, Side::Source, key_columns)?;
    let target_keys = key_set(target, Side::Target, key_columns)?;

    Ok(KeyDiff {
        missing_in_target: source_keys.difference(&target_keys).cloned().collect(),
        missing_in_source: target_keys.difference(&source_keys).cloned().collect(),
    })
}

/// Every key occurring more than once in `dataset`, in key order.
pub fn duplicate_keys(
    dataset: &Dataset,
    side: Side,
    key_columns: &[String],
) -> Result<Vec<DuplicateKey>> {
    let mut counts: BTreeMap<RecordKey, usize> = BTreeMap::new();
    for (key, _) in keyed_records(dataset, side, key_columns)? {
        *counts.entry(key).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, count)| DuplicateKey { side, key, count })
        .collect())
}
