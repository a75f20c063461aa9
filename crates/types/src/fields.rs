use std::fmt;

use serde::Serialize;

use crate::CollectionType;

/// Input kind of a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Text that must parse as a non-negative decimal number.
    Number,
    /// Text that must parse as a whole number within `min..=max`.
    Integer { min: u64, max: u64 },
    /// One of a fixed set of options; the first option is the default.
    Choice(&'static [&'static str]),
}

/// Shape of one input field: the key suffix it is stored under, how it is
/// edited, and how it is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Last segment of the flat form key (`host` in `volume.3.host`).
    pub suffix: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Value filled in when the field is created; choices fall back to their first option.
    pub default: Option<&'static str>,
}

impl FieldSpec {
    /// Value a freshly created field starts with.
    pub fn initial_value(&self) -> &'static str {
        if let Some(default) = self.default {
            return default;
        }
        match self.kind {
            FieldKind::Choice(options) => options.first().copied().unwrap_or_default(),
            FieldKind::Text | FieldKind::Number | FieldKind::Integer { .. } => "",
        }
    }
}

/// Shape of one entry of a dynamic collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntrySpec {
    pub collection: CollectionType,
    pub fields: &'static [FieldSpec],
}

impl EntrySpec {
    /// Find a field by its key suffix.
    pub fn field(&self, suffix: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.suffix == suffix)
    }
}

/// Fixed (non-repeated) fields of the launch form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarField {
    DockerImage,
    Command,
    Cpu,
    Memory,
    CallbackUrl,
    Network,
    ForcePullImage,
}

impl ScalarField {
    /// Every scalar field, in form display order.
    pub const ALL: [ScalarField; 7] = [
        ScalarField::DockerImage,
        ScalarField::Command,
        ScalarField::Cpu,
        ScalarField::Memory,
        ScalarField::CallbackUrl,
        ScalarField::Network,
        ScalarField::ForcePullImage,
    ];

    /// Flat form key of the field; identical to the payload field name.
    pub fn key(self) -> &'static str {
        match self {
            ScalarField::DockerImage => "docker_image",
            ScalarField::Command => "command",
            ScalarField::Cpu => "cpu",
            ScalarField::Memory => "memory",
            ScalarField::CallbackUrl => "callback_url",
            ScalarField::Network => "network",
            ScalarField::ForcePullImage => "force_pull_image",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
