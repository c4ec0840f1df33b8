use crate::model::Value;

/// Canonical form of a missing value. Two nulls always normalize equal.
pub const NULL_MARKER: &str = "none";

/// Canonical comparable form of a value: string form, trimmed, lowercased.
pub fn normalize(value: &Value) -> String {
    match value {
        Value::Null => NULL_MARKER.to_string(),
        other => other.to_string().trim().to_lowercase(),
    }
}
