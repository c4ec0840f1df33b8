use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{ReconError, Result};
use crate::matcher::Threshold;
use crate::model::{Dataset, Side};

pub const DEFAULT_KEY_COLUMN: &str = "ID";

// ---------------------------------------------------------------------------
// Comparison spec
// ---------------------------------------------------------------------------

/// What to compare and how tolerant to be. Validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSpec {
    key_columns: Vec<String>,
    columns: Option<Vec<String>>,
    threshold: Threshold,
}

impl ComparisonSpec {
    /// `columns = None` (or an empty list) compares every non-key column.
    pub fn new(
        key_columns: Vec<String>,
        columns: Option<Vec<String>>,
        threshold: Threshold,
    ) -> Result<Self> {
        if key_columns.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one key column is required".into(),
            ));
        }
        if let Some(dup) = first_duplicate(&key_columns) {
            return Err(ReconError::ConfigValidation(format!(
                "key column '{dup}' listed more than once"
            )));
        }

        let columns = columns.filter(|c| !c.is_empty());
        if let Some(ref cols) = columns {
            if let Some(key) = cols.iter().find(|c| key_columns.contains(*c)) {
                return Err(ReconError::KeyColumnCompared(key.clone()));
            }
            if let Some(dup) = first_duplicate(cols) {
                return Err(ReconError::ConfigValidation(format!(
                    "comparison column '{dup}' listed more than once"
                )));
            }
        }

        Ok(Self {
            key_columns,
            columns,
            threshold,
        })
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Columns to compare for this dataset pair.
    ///
    /// Explicit columns must exist in both schemas. Without an explicit list,
    /// every non-key column of either schema is compared (source order, then
    /// target-only columns), so a column present on one side only is reported
    /// as missing rather than silently skipped.
    pub fn resolve_columns(&self, source: &Dataset, target: &Dataset) -> Result<Vec<String>> {
        let columns: Vec<String> = match &self.columns {
            Some(cols) => cols.clone(),
            None => {
                let mut seen = HashSet::new();
                source
                    .columns
                    .iter()
                    .chain(target.columns.iter())
                    .filter(|c| !self.key_columns.contains(*c))
                    .filter(|c| seen.insert(c.as_str()))
                    .cloned()
                    .collect()
            }
        };

        for column in &columns {
            if !source.has_column(column) {
                return Err(ReconError::MissingColumn {
                    side: Side::Source,
                    column: column.clone(),
                });
            }
            if !target.has_column(column) {
                return Err(ReconError::MissingColumn {
                    side: Side::Target,
                    column: column.clone(),
                });
            }
        }

        Ok(columns)
    }
}

impl Default for ComparisonSpec {
    fn default() -> Self {
        Self {
            key_columns: vec![DEFAULT_KEY_COLUMN.to_string()],
            columns: None,
            threshold: Threshold::default(),
        }
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names.iter().map(String::as_str).find(|n| !seen.insert(*n))
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub name: String,
    pub source: DatasetConfig,
    pub target: DatasetConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    #[serde(default = "default_key_columns")]
    pub key_columns: Vec<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            key_columns: default_key_columns(),
            columns: None,
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

fn default_delimiter() -> char {
    ','
}

fn default_key_columns() -> Vec<String> {
    vec![DEFAULT_KEY_COLUMN.to_string()]
}

fn default_threshold() -> f64 {
    Threshold::DEFAULT.value()
}

/// Delimiters must be a single ASCII byte.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(ReconError::ConfigValidation(format!(
            "delimiter must be a single ASCII character, got '{delimiter}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }
        for (side, ds) in [(Side::Source, &self.source), (Side::Target, &self.target)] {
            if ds.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{side}: file must not be empty")));
            }
            delimiter_byte(ds.delimiter)?;
        }
        self.comparison_spec()?;
        Ok(())
    }

    pub fn comparison_spec(&self) -> Result<ComparisonSpec> {
        ComparisonSpec::new(
            self.compare.key_columns.clone(),
            self.compare.columns.clone(),
            Threshold::new(self.compare.threshold)?,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
