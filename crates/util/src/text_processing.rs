//! # Text Processing Utilities
//!
//! Masking for secret values shown on screen and redaction of secret-looking
//! values before text reaches the log file.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Character drawn in place of each hidden character.
pub const MASK_CHAR: char = '•';
const MAX_MASK_WIDTH: usize = 12;

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*)(\S+(?:\s+\S+)?)",
        r"(?i)\b([A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)=)(\S+)",
        r"(?i)(://[^:/\s]+:)([^@\s]+)(@)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Hide a value for display, keeping a hint of its length.
///
/// ```rust
/// use eremetic_util::mask_value;
///
/// assert_eq!(mask_value(""), "");
/// assert_eq!(mask_value("abc"), "•••");
/// ```
pub fn mask_value(value: &str) -> String {
    let width = value.chars().count().min(MAX_MASK_WIDTH);
    std::iter::repeat_n(MASK_CHAR, width).collect()
}

/// Redacts values that look like secrets in a string.
///
/// ```rust
/// use eremetic_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("API_KEY=abc123 mode=fast"), "API_KEY=[REDACTED] mode=fast");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    REDACT_PATTERNS.iter().fold(input.to_string(), |text, pattern| {
        pattern
            .replace_all(&text, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or_default();
                format!("{prefix}[REDACTED]{suffix}")
            })
            .into_owned()
    })
}

/// Copy of a launch payload with every `masked_env` value replaced, for logs.
pub fn redact_masked_env(payload: &Value) -> Value {
    let mut redacted = payload.clone();
    if let Some(Value::Object(masked)) = redacted.get_mut("masked_env") {
        for value in masked.values_mut() {
            *value = Value::String("[REDACTED]".to_string());
        }
    }
    redacted
}
