//! A single kind's storage: allocator plus the records themselves, keyed
//! by the full id (so the current generation is always at hand).

use std::collections::HashMap;

use noodles_ids::{ComponentId, ComponentKind, IdAllocator};

use crate::error::RegistryError;

/// Storage for every live component of one [`ComponentKind`].
pub struct Table<R> {
    kind: ComponentKind,
    alloc: IdAllocator,
    records: HashMap<ComponentId, R>,
}

impl<R> Table<R> {
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            alloc: IdAllocator::new(kind),
            records: HashMap::new(),
        }
    }

    /// Allocate a fresh id and store `record` under it.
    pub fn insert(&mut self, record: R) -> ComponentId {
        let id = self.alloc.alloc();
        self.records.insert(id, record);
        id
    }

    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<&R> {
        if !self.alive(id) {
            return None;
        }
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut R> {
        if !self.alive(id) {
            return None;
        }
        self.records.get_mut(&id)
    }

    /// Remove a live component, returning its stored record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::StaleId`] if `id` does not name a currently
    /// live component of this table's kind.
    pub fn remove(&mut self, id: ComponentId) -> Result<R, RegistryError> {
        self.alloc
            .free(id)
            .map_err(|_| RegistryError::StaleId(id))?;
        Ok(self
            .records
            .remove(&id)
            .expect("allocator and record storage out of sync"))
    }

    #[must_use]
    pub fn alive(&self, id: ComponentId) -> bool {
        id.kind == self.kind && self.alloc.alive(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.records.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &R)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let mut table: Table<&'static str> = Table::new(ComponentKind::Buffer);
        let id = table.insert("hello");
        assert_eq!(table.get(id), Some(&"hello"));
    }

    #[test]
    fn remove_then_get_returns_none() {
        let mut table: Table<&'static str> = Table::new(ComponentKind::Buffer);
        let id = table.insert("hello");
        table.remove(id).unwrap();
        assert_eq!(table.get(id), None);
    }

    #[test]
    fn remove_twice_is_an_error() {
        let mut table: Table<&'static str> = Table::new(ComponentKind::Buffer);
        let id = table.insert("hello");
        table.remove(id).unwrap();
        assert_eq!(table.remove(id), Err(RegistryError::StaleId(id)));
    }

    #[test]
    fn reused_slot_keeps_old_id_dead() {
        let mut table: Table<u32> = Table::new(ComponentKind::Buffer);
        let first = table.insert(1);
        table.remove(first).unwrap();
        let second = table.insert(2);
        assert_eq!(second.slot, first.slot);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&2));
    }
}
