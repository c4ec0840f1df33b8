use std::collections::{BTreeSet, HashMap};
use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A raw field value as supplied by the loader.
///
/// Totally ordered so that values can form sortable keys. Variants order
/// before payloads (`Null < Bool < Int < Float < Text`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Canonical form for joining on keys: an integral float within `i64`
    /// range becomes `Int`, so `1` and `1.0` identify the same record.
    pub fn key_form(&self) -> Value {
        match self {
            Self::Float(x) if x.0.fract() == 0.0 && x.0 >= I64_LOWER && x.0 < I64_UPPER => {
                Self::Int(x.0 as i64)
            }
            other => other.clone(),
        }
    }
}

/// `i64` bounds as exactly representable floats: [-2^63, 2^63).
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Raw display. Null renders as an empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{}", x.0),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(OrderedFloat(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

// ---------------------------------------------------------------------------
// Records + datasets
// ---------------------------------------------------------------------------

/// One row: column name → raw value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used by loaders and tests.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// An ordered collection of records sharing one column schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Which input a record, column or warning belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Key values of one record, one per key column, in key-column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(pub Vec<Value>);

impl RecordKey {
    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }
}

/// Composite keys render as `a|b|c`.
impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl Serialize for RecordKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A key seen more than once within one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub side: Side,
    pub key: RecordKey,
    pub count: usize,
}

/// Output of the key differ. Sets iterate in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    pub missing_in_target: BTreeSet<RecordKey>,
    pub missing_in_source: BTreeSet<RecordKey>,
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Source and target records sharing one key.
#[derive(Debug, Clone)]
pub struct AlignedPair<'a> {
    pub key: RecordKey,
    pub source: &'a Record,
    pub target: &'a Record,
}

// ---------------------------------------------------------------------------
// Discrepancies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    MissingInTarget,
    MissingInSource,
    FieldMismatch,
}

impl EntryKind {
    /// Human-readable label used by the CSV report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingInTarget => "Missing in Target",
            Self::MissingInSource => "Missing in Source",
            Self::FieldMismatch => "Field Discrepancy",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInTarget => write!(f, "missing_in_target"),
            Self::MissingInSource => write!(f, "missing_in_source"),
            Self::FieldMismatch => write!(f, "field_mismatch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscrepancyEntry {
    MissingInTarget {
        record_id: RecordKey,
    },
    MissingInSource {
        record_id: RecordKey,
    },
    FieldMismatch {
        record_id: RecordKey,
        field: String,
        source_value: Value,
        target_value: Value,
    },
}

impl DiscrepancyEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::MissingInTarget { .. } => EntryKind::MissingInTarget,
            Self::MissingInSource { .. } => EntryKind::MissingInSource,
            Self::FieldMismatch { .. } => EntryKind::FieldMismatch,
        }
    }

    pub fn record_id(&self) -> &RecordKey {
        match self {
            Self::MissingInTarget { record_id }
            | Self::MissingInSource { record_id }
            | Self::FieldMismatch { record_id, .. } => record_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub missing_in_target: usize,
    pub missing_in_source: usize,
    pub field_mismatches: usize,
    /// Distinct records carrying at least one field mismatch.
    pub records_with_mismatches: usize,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.missing_in_target + self.missing_in_source + self.field_mismatches
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconReport {
    pub summary: ReportSummary,
    pub entries: Vec<DiscrepancyEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_keys: Vec<DuplicateKey>,
}
