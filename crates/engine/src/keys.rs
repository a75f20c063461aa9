//! Flat form keys.
//!
//! Every value in a form session lives under one key. Scalars use their bare
//! name (`cpu`); entry fields are derived from the collection prefix, the
//! entry id and the field suffix (`volume.3.host`, `port.7.protocol`). The
//! typed [`FieldKey`] guarantees the suffix belongs to the collection.

use std::fmt;
use std::str::FromStr;

use eremetic_types::{CollectionType, EntryId, FieldSpec, ScalarField};

use crate::error::KeyParseError;
use crate::registry::{definition_for, scalar_definition};

/// Key of one value in [`FormValues`](crate::FormValues).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Scalar(ScalarField),
    Entry {
        collection: CollectionType,
        id: EntryId,
        suffix: &'static str,
    },
}

impl FieldKey {
    /// Key for a field of an entry. Returns `None` if the collection's entries
    /// have no field with this suffix.
    pub fn entry(collection: CollectionType, id: EntryId, suffix: &str) -> Option<Self> {
        let field = definition_for(collection).field(suffix)?;
        Some(FieldKey::Entry {
            collection,
            id,
            suffix: field.suffix,
        })
    }

    /// All keys that make up one entry, in field order.
    pub fn entry_keys(collection: CollectionType, id: EntryId) -> impl Iterator<Item = FieldKey> {
        definition_for(collection).fields.iter().map(move |field| FieldKey::Entry {
            collection,
            id,
            suffix: field.suffix,
        })
    }

    /// Field definition behind this key.
    pub fn spec(&self) -> Option<&'static FieldSpec> {
        match self {
            FieldKey::Scalar(field) => Some(scalar_definition(*field)),
            FieldKey::Entry { collection, suffix, .. } => definition_for(*collection).field(suffix),
        }
    }

    /// Owning entry of the key, if it belongs to a collection.
    pub fn entry_of(&self) -> Option<(CollectionType, EntryId)> {
        match self {
            FieldKey::Scalar(_) => None,
            FieldKey::Entry { collection, id, .. } => Some((*collection, *id)),
        }
    }
}

impl From<ScalarField> for FieldKey {
    fn from(field: ScalarField) -> Self {
        FieldKey::Scalar(field)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Scalar(field) => f.write_str(field.key()),
            FieldKey::Entry { collection, id, suffix } => {
                write!(f, "{}.{}.{}", collection.key_prefix(), id, suffix)
            }
        }
    }
}

impl FromStr for FieldKey {
    type Err = KeyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut segments = raw.split('.');
        let first = segments.next().unwrap_or_default();
        let (Some(id), Some(suffix)) = (segments.next(), segments.next()) else {
            return ScalarField::from_key(raw)
                .map(FieldKey::Scalar)
                .ok_or_else(|| KeyParseError::UnknownScalar(raw.to_string()));
        };
        if segments.next().is_some() {
            return Err(KeyParseError::Malformed(raw.to_string()));
        }
        let collection = CollectionType::from_key_prefix(first).ok_or_else(|| KeyParseError::UnknownPrefix(first.to_string()))?;
        let id = id
            .parse::<EntryId>()
            .map_err(|_| KeyParseError::InvalidEntryId(id.to_string()))?;
        FieldKey::entry(collection, id, suffix).ok_or_else(|| KeyParseError::UnknownSuffix {
            collection,
            suffix: suffix.to_string(),
        })
    }
}
