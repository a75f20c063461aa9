use indexmap::IndexMap;

use crate::keys::FieldKey;

/// Flat map of every value in a form session.
///
/// This is the only data the payload transformer reads. Insertion order is
/// kept so rendering and serialization stay stable across edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: IndexMap<FieldKey, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.values.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one.
    pub(crate) fn insert(&mut self, key: FieldKey, value: String) -> Option<String> {
        self.values.insert(key, value)
    }

    pub(crate) fn remove(&mut self, key: &FieldKey) -> Option<String> {
        self.values.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.values.iter().map(|(key, value)| (key, value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.values.keys()
    }
}
