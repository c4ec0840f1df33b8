use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (duplicate column, empty key list, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// Similarity threshold outside (0, 1].
    #[error("threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("key column '{0}' cannot also be a comparison column")]
    KeyColumnCompared(String),

    /// Key column absent from a dataset's schema.
    #[error("{side} dataset: missing key column '{column}'")]
    MissingKeyColumn { side: Side, column: String },

    /// Comparison column absent from a dataset's schema.
    #[error("{side} dataset: missing comparison column '{column}'")]
    MissingColumn { side: Side, column: String },

    /// A record has no value for a column its dataset declares.
    #[error("{side} record '{record_id}': no value for column '{column}'")]
    MissingField {
        side: Side,
        record_id: String,
        column: String,
    },

    /// Malformed input file (bad header, no header row).
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconError {
    /// True for errors raised before any comparison work starts because the
    /// requested run cannot be set up.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse(_)
                | Self::ConfigValidation(_)
                | Self::InvalidThreshold(_)
                | Self::KeyColumnCompared(_)
                | Self::MissingKeyColumn { .. }
                | Self::MissingColumn { .. }
        )
    }

    /// True for errors produced while reading input data.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Parse { .. } => true,
            Self::Csv(e) => !matches!(e.kind(), csv::ErrorKind::Io(_)),
            _ => false,
        }
    }

    /// Reading or writing failed, including reads that fail inside the CSV reader.
    pub fn is_io_error(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Csv(e) => matches!(e.kind(), csv::ErrorKind::Io(_)),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
