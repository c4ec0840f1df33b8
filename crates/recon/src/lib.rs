//! `tally-recon`: keyed reconciliation of two tabular datasets.
//!
//! Pure engine: receives two loaded [`Dataset`]s and a [`ComparisonSpec`],
//! returns a [`ReconReport`] of missing records and field mismatches.
//! The CSV [`loader`] and TOML [`config`] live here too; no CLI dependencies.

pub mod align;
pub mod analyze;
pub mod config;
pub mod differ;
pub mod engine;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;

pub use config::{ComparisonSpec, ReconConfig};
pub use engine::run;
pub use error::{ReconError, Result};
pub use matcher::{matches, Threshold};
pub use model::{
    DiscrepancyEntry, Dataset, EntryKind, Record, RecordKey, ReconReport, ReportSummary, Side,
    Value,
};
pub use normalize::normalize;
