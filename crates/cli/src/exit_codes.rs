//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `tally` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success (including "discrepancies found" by default)      |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad arguments, key column compared)          |
//! | 3    | Discrepancies found (only with `--fail-on-discrepancy`)   |
//! | 4    | Invalid configuration (missing column, bad threshold)     |
//! | 5    | Input parse error (malformed CSV, bad header)             |
//! | 6    | I/O error (unreadable input, unwritable output)           |

use tally_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Reconciliation finished and found at least one discrepancy.
/// Only returned when `--fail-on-discrepancy` is set.
pub const EXIT_DISCREPANCIES: u8 = 3;

/// Config file or comparison setup is invalid.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Input file could not be parsed.
pub const EXIT_PARSE: u8 = 5;

/// Reading input or writing output failed.
pub const EXIT_IO: u8 = 6;

/// Map a library error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::KeyColumnCompared(_) => EXIT_USAGE,
        e if e.is_io_error() => EXIT_IO,
        e if e.is_config_error() => EXIT_INVALID_CONFIG,
        e if e.is_input_error() => EXIT_PARSE,
        ReconError::MissingField { .. } => EXIT_PARSE,
        _ => EXIT_ERROR,
    }
}
