//! Typed component identifiers.
//!
//! A [`ComponentId`] is a `(kind, slot, generation)` triple: the kind tag
//! and generation counter are what let the registry detect a stale
//! reference after a slot has been reused.

use serde::{Deserialize, Serialize};

use crate::kind::ComponentKind;

/// A unique, typed identifier for a live (or formerly live) component.
///
/// Equality, hashing, and ordering are by `(kind, slot, generation)`. Two
/// IDs of the same kind and slot but different generations are never
/// equal — that's precisely what lets the registry detect a stale
/// reference after a slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    pub kind: ComponentKind,
    pub slot: u32,
    pub generation: u32,
}

impl ComponentId {
    #[must_use]
    pub const fn new(kind: ComponentKind, slot: u32, generation: u32) -> Self {
        Self {
            kind,
            slot,
            generation,
        }
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}/{}", self.kind, self.slot, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_with_different_generations_are_not_equal() {
        let a = ComponentId::new(ComponentKind::Entity, 0, 0);
        let b = ComponentId::new(ComponentKind::Entity, 0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn ids_with_different_kinds_are_not_equal_even_with_same_slot_gen() {
        let a = ComponentId::new(ComponentKind::Entity, 0, 0);
        let b = ComponentId::new(ComponentKind::Buffer, 0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn serialization_roundtrip() {
        let id = ComponentId::new(ComponentKind::Texture, 7, 3);
        let bytes = serde_json::to_vec(&id).unwrap();
        let restored: ComponentId = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(id, restored);
    }
}
