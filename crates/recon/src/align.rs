use std::collections::BTreeMap;

use crate::differ::keyed_records;
use crate::error::Result;
use crate::model::{AlignedPair, Dataset, Record, RecordKey, Side};

/// First occurrence of each key wins.
fn first_by_key<'a>(
    dataset: &'a Dataset,
    side: Side,
    key_columns: &[String],
) -> Result<BTreeMap<RecordKey, &'a Record>> {
    let mut index = BTreeMap::new();
    for (key, record) in keyed_records(dataset, side, key_columns)? {
        index.entry(key).or_insert(record);
    }
    Ok(index)
}

/// Inner join on key: one pair per key present on both sides, in key order.
///
/// A key repeated within one dataset is represented by its first occurrence
/// in file order; later occurrences are not compared.
pub fn align<'a>(
    source: &'a Dataset,
    target: &'a Dataset,
    key_columns: &[String],
) -> Result<Vec<AlignedPair<'a>>> {
    let source_index = first_by_key(source, Side::Source, key_columns)?;
    let mut target_index = first_by_key(target, Side::Target, key_columns)?;

    Ok(source_index
        .into_iter()
        .filter_map(|(key, source)| {
            target_index
                .remove(&key)
                .map(|target| AlignedPair { key, source, target })
        })
        .collect())
}
