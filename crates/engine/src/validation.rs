//! Field validation.
//!
//! Validation is a pure function of the form values and the set of touched
//! keys. Errors are only reported for touched fields, so a freshly added
//! entry renders clean until the user edits it or attempts a submit.

use eremetic_types::{FieldKind, FieldSpec};
use indexmap::{IndexMap, IndexSet};

use crate::keys::FieldKey;
use crate::values::FormValues;

/// Validation status of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStatus {
    pub touched: bool,
    pub error: Option<String>,
}

/// Per-key touched flags and errors derived from [`FormValues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    statuses: IndexMap<FieldKey, FieldStatus>,
}

impl ValidationState {
    /// Derive the state for every key in `values`.
    pub fn derive(values: &FormValues, touched: &IndexSet<FieldKey>) -> Self {
        let statuses = values
            .iter()
            .map(|(key, value)| {
                let is_touched = touched.contains(key);
                let error = if is_touched {
                    key.spec().and_then(|spec| validate_value(spec, value))
                } else {
                    None
                };
                (
                    *key,
                    FieldStatus {
                        touched: is_touched,
                        error,
                    },
                )
            })
            .collect();
        Self { statuses }
    }

    pub fn status(&self, key: &FieldKey) -> Option<&FieldStatus> {
        self.statuses.get(key)
    }

    pub fn error(&self, key: &FieldKey) -> Option<&str> {
        self.statuses.get(key).and_then(|status| status.error.as_deref())
    }

    pub fn is_touched(&self, key: &FieldKey) -> bool {
        self.statuses.get(key).is_some_and(|status| status.touched)
    }

    pub fn has_errors(&self) -> bool {
        self.statuses.values().any(|status| status.error.is_some())
    }

    /// Keys currently carrying an error, in form order.
    pub fn errored_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.statuses
            .iter()
            .filter(|(_, status)| status.error.is_some())
            .map(|(key, _)| key)
    }

    pub(crate) fn set_error(&mut self, key: FieldKey, message: String) {
        let status = self.statuses.entry(key).or_default();
        status.touched = true;
        status.error = Some(message);
    }
}

/// Check one value against its field definition.
///
/// Returns the message to show next to the field, or `None` when valid.
pub fn validate_value(spec: &FieldSpec, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return spec.required.then(|| format!("{} is required", spec.label));
    }
    match spec.kind {
        FieldKind::Text => None,
        FieldKind::Number => match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() && number >= 0.0 => None,
            _ => Some(format!("{} must be a non-negative number", spec.label)),
        },
        FieldKind::Integer { min, max } => match trimmed.parse::<u64>() {
            Ok(number) if (min..=max).contains(&number) => None,
            _ => Some(format!("{} must be a whole number between {min} and {max}", spec.label)),
        },
        FieldKind::Choice(options) => {
            (!options.contains(&trimmed)).then(|| format!("{} must be one of {}", spec.label, options.join(", ")))
        }
    }
}
