//! Error types for the launch form engine.

use eremetic_types::CollectionType;
use thiserror::Error;

/// Lookup failures in the field definition registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A collection tag outside the closed set reached the registry. This is
    /// a programming error, never a user error.
    #[error("unsupported collection type '{tag}'")]
    UnsupportedCollectionType { tag: String },
}

/// Failures while parsing a flat form key such as `port.2.value`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("unknown form field '{0}'")]
    UnknownScalar(String),
    #[error("unknown entry prefix '{0}'")]
    UnknownPrefix(String),
    #[error("invalid entry id '{0}'")]
    InvalidEntryId(String),
    #[error("'{collection}' entries have no field '{suffix}'")]
    UnknownSuffix { collection: CollectionType, suffix: String },
    #[error("malformed form key '{0}'")]
    Malformed(String),
}

/// Failures while converting form values into a launch request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A numeric field holds text that does not parse.
    #[error("{key} must be numeric, got '{value}'")]
    MalformedNumeric { key: String, value: String },
    /// A choice field holds a value outside its options.
    #[error("{key} has unsupported value '{value}'")]
    InvalidChoice { key: String, value: String },
    /// An entry is registered in its collection but one of its values is
    /// absent. The session never produces this state.
    #[error("form value '{key}' is missing for a registered entry")]
    MissingField { key: String },
}

/// Rejected session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("no submission is in flight")]
    NotSubmitting,
    #[error("the session has completed and no longer accepts changes")]
    Closed,
    #[error("submission result belongs to a session or attempt that is no longer active")]
    StaleTicket,
    #[error("form has {} invalid field(s): {}", fields.len(), fields.join(", "))]
    Invalid { fields: Vec<String> },
    #[error("no such form field '{0}'")]
    UnknownField(String),
    #[error("internal form error: {0}")]
    Internal(#[from] TransformError),
}
