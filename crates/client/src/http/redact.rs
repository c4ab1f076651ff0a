//! Redaction of sensitive values before anything reaches a log line.

use serde_json::Value;

/// Replacement for redacted values.
pub const REDACTED: &str = "[REDACTED]";

const SENSITIVE_KEY_MARKERS: &[&str] = &["key", "password", "token", "secret", "auth"];

/// Recursively replace the value of any object key that case-insensitively
/// contains one of the sensitive markers. Arrays and nested objects are
/// walked; non-matching leaves are cloned unchanged.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| {
                    if is_sensitive(key) {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact(child))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SENSITIVE_KEY_MARKERS.iter().any(|marker| lower.contains(marker))
}
