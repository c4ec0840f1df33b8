//! CSV → [`Dataset`] loading. Lives beside the engine but is not used by it:
//! the engine only ever sees fully-loaded datasets.

use std::collections::HashSet;
use std::path::Path;

use ordered_float::OrderedFloat;

use crate::error::{ReconError, Result};
use crate::model::{Dataset, Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Significant decimal digits an `f64` always holds exactly.
const F64_EXACT_DIGITS: usize = 15;

/// Type a raw cell: empty → Null, then bool, integer, finite float, text.
///
/// Typing looks at the trimmed cell; text keeps its raw form. A number is
/// only typed when its value survives the conversion: integers outside
/// `i64` and decimals with more significant digits than an `f64` holds stay
/// text.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Int(n);
    }
    if is_exact_decimal(trimmed) {
        if let Ok(x) = trimmed.parse::<f64>() {
            if x.is_finite() {
                return Value::Float(OrderedFloat(x));
            }
        }
    }
    Value::Text(raw.to_string())
}

/// Decimal-point or exponent notation with few enough significant digits to
/// round-trip through `f64`.
fn is_exact_decimal(text: &str) -> bool {
    if !text.contains(['.', 'e', 'E']) {
        return false;
    }
    let mantissa = text.split(['e', 'E']).next().unwrap_or(text);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let significant = digits.trim_start_matches('0').trim_end_matches('0');
    significant.len() <= F64_EXACT_DIGITS
}

/// Parse CSV text with a header row into a dataset.
pub fn load_csv(csv_data: &str, options: &LoadOptions) -> Result<Dataset> {
    load_from_reader(csv_data.as_bytes(), options)
}

pub fn load_csv_file(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    let dataset = load_from_reader(file, options)?;
    tracing::debug!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn load_from_reader<R: std::io::Read>(input: R, options: &LoadOptions) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .flexible(false)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    if headers.is_empty() {
        return Err(ReconError::Parse {
            line: 1,
            message: "missing header row".into(),
        });
    }

    let mut seen = HashSet::new();
    for (i, h) in headers.iter().enumerate() {
        if h.trim().is_empty() {
            return Err(ReconError::Parse {
                line: 1,
                message: format!("header {} is empty", i + 1),
            });
        }
        if !seen.insert(h.as_str()) {
            return Err(ReconError::Parse {
                line: 1,
                message: format!("duplicate header '{h}'"),
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, cell)| (h.clone(), parse_cell(cell)))
            .collect();
        records.push(record);
    }

    Ok(Dataset::new(headers, records))
}
