use std::fmt;

use serde::Serialize;

use crate::error::{ReconError, Result};
use crate::model::Value;
use crate::normalize::normalize;

/// Slack added to the allowed distance so that a ratio landing exactly on the
/// threshold (e.g. 1 edit in 10 chars at 0.9) is not lost to float rounding.
const ALLOWED_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// Similarity threshold in (0, 1]. 1 requires exact equality after
/// normalization; lower values tolerate more divergence.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold(f64);

impl Threshold {
    pub const EXACT: Threshold = Threshold(1.0);
    pub const DEFAULT: Threshold = Threshold(0.9);

    pub fn new(value: f64) -> Result<Self> {
        // NaN fails both comparisons
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ReconError::InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Maximum edit distance tolerated between strings of these lengths.
    pub fn allowed_distance(&self, max_len: usize) -> f64 {
        max_len as f64 * (1.0 - self.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Threshold {
    type Error = ReconError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Edit distance
// ---------------------------------------------------------------------------

/// Levenshtein distance over Unicode scalar values (two-row Wagner-Fischer).
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Keep the shorter string in the inner loop.
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (j, lc) in long.iter().enumerate() {
        curr[0] = j + 1;
        for (i, sc) in short.iter().enumerate() {
            let cost = usize::from(sc != lc);
            curr[i + 1] = (prev[i + 1] + 1)
                .min(curr[i] + 1)
                .min(prev[i] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Normalized similarity `1 - distance / max_len`; 1.0 for two empty strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// True if `a` and `b` are equivalent under `threshold` after normalization.
pub fn matches(a: &Value, b: &Value, threshold: Threshold) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return true;
    }

    let max_len = a.chars().count().max(b.chars().count());
    let allowed = threshold.allowed_distance(max_len) + ALLOWED_EPSILON;
    edit_distance(&a, &b) as f64 <= allowed
}
