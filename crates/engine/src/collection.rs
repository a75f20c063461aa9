//! Dynamic collection store.
//!
//! Tracks which entries exist in each collection and hands out their ids.
//! Each collection owns a counter that only moves forward, so an id retired
//! by `remove` can never be issued again within the same store. The store
//! holds ids only; entry values live in [`FormValues`](crate::FormValues).

use std::collections::BTreeMap;

use eremetic_types::{CollectionType, EntryId};
use indexmap::IndexSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CollectionInstance {
    ids: IndexSet<EntryId>,
    next_id: u64,
}

/// Per-collection ordered sets of live entry ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStore {
    instances: BTreeMap<CollectionType, CollectionInstance>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id and append it to the collection.
    pub(crate) fn allocate(&mut self, collection: CollectionType) -> EntryId {
        let instance = self.instances.entry(collection).or_default();
        let id = EntryId::new(instance.next_id);
        instance.next_id += 1;
        instance.ids.insert(id);
        id
    }

    /// Retire an id. Returns `false` if it was not live.
    pub(crate) fn retire(&mut self, collection: CollectionType, id: EntryId) -> bool {
        self.instances
            .get_mut(&collection)
            .is_some_and(|instance| instance.ids.shift_remove(&id))
    }

    pub fn contains(&self, collection: CollectionType, id: EntryId) -> bool {
        self.instances
            .get(&collection)
            .is_some_and(|instance| instance.ids.contains(&id))
    }

    /// Live ids of a collection in insertion order.
    pub fn ids(&self, collection: CollectionType) -> impl Iterator<Item = EntryId> + '_ {
        self.instances
            .get(&collection)
            .into_iter()
            .flat_map(|instance| instance.ids.iter().copied())
    }

    pub fn len(&self, collection: CollectionType) -> usize {
        self.instances.get(&collection).map_or(0, |instance| instance.ids.len())
    }

    pub fn is_empty(&self) -> bool {
        self.instances.values().all(|instance| instance.ids.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retired_ids_are_never_reissued() {
        let mut store = CollectionStore::new();
        let first = store.allocate(CollectionType::Envs);
        let second = store.allocate(CollectionType::Envs);
        assert!(store.retire(CollectionType::Envs, second));
        let third = store.allocate(CollectionType::Envs);

        assert_ne!(third, second);
        assert_ne!(third, first);
        assert_eq!(store.ids(CollectionType::Envs).collect::<Vec<_>>(), vec![first, third]);
    }

    #[test]
    fn collections_are_independent() {
        let mut store = CollectionStore::new();
        let volume = store.allocate(CollectionType::Volumes);
        store.allocate(CollectionType::Ports);

        assert!(!store.retire(CollectionType::Ports, EntryId::new(99)));
        assert!(store.contains(CollectionType::Volumes, volume));
        assert_eq!(store.len(CollectionType::Ports), 1);
        assert_eq!(store.len(CollectionType::Uris), 0);
    }
}
