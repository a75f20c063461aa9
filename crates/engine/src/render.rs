//! Entry renderer.
//!
//! Produces view models for form rows. A view is computed from the session's
//! values and validation state on every draw and holds no state of its own;
//! edits go back through the session keyed by [`FieldView::key`].

use eremetic_types::{CollectionType, EntryId, FieldKind, FieldSpec, ScalarField};

use crate::keys::FieldKey;
use crate::registry::{definition_for, lookup, scalar_definition};
use crate::validation::ValidationState;
use crate::values::FormValues;

/// One input bound to a form key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub key: FieldKey,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub touched: bool,
    pub error: Option<String>,
    /// The value should be hidden on screen.
    pub masked: bool,
}

/// All inputs of one collection entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub collection: CollectionType,
    pub id: EntryId,
    pub fields: Vec<FieldView>,
}

impl EntryRow {
    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|field| field.error.is_some())
    }
}

fn field_view(key: FieldKey, spec: &FieldSpec, values: &FormValues, validation: &ValidationState, masked: bool) -> FieldView {
    let status = validation.status(&key);
    FieldView {
        key,
        label: spec.label,
        placeholder: spec.placeholder,
        kind: spec.kind,
        required: spec.required,
        value: values.get(&key).unwrap_or_default().to_string(),
        touched: status.is_some_and(|status| status.touched),
        error: status.and_then(|status| status.error.clone()),
        masked,
    }
}

/// Render the row for one entry.
pub fn render_entry(collection: CollectionType, id: EntryId, values: &FormValues, validation: &ValidationState) -> EntryRow {
    let spec = definition_for(collection);
    let fields = spec
        .fields
        .iter()
        .map(|field| {
            let key = FieldKey::Entry {
                collection,
                id,
                suffix: field.suffix,
            };
            let masked = collection.is_masked() && field.suffix == "value";
            field_view(key, field, values, validation, masked)
        })
        .collect();
    EntryRow { collection, id, fields }
}

/// Render an entry from a textual collection tag.
///
/// Unknown tags are logged by the registry and render nothing.
pub fn render_entry_for_tag(tag: &str, id: EntryId, values: &FormValues, validation: &ValidationState) -> Option<EntryRow> {
    let spec = lookup(tag).ok()?;
    Some(render_entry(spec.collection, id, values, validation))
}

/// Render a scalar input.
pub fn render_scalar(field: ScalarField, values: &FormValues, validation: &ValidationState) -> FieldView {
    field_view(FieldKey::Scalar(field), scalar_definition(field), values, validation, false)
}
