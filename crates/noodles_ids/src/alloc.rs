//! Per-kind ID allocation with generation-based slot reuse.
//!
//! Allocation hands out a `(slot, generation)` pair per component; freeing
//! bumps the slot's generation and returns the slot to a free list, so a
//! later allocation can reuse the slot while any reference still holding
//! the old generation reads as dead rather than silently pointing at
//! whatever got allocated next.

use std::collections::HashSet;

use crate::id::ComponentId;
use crate::kind::ComponentKind;

/// Error returned by [`IdAllocator::free`] when asked to free an ID that
/// isn't currently alive (already freed, or never allocated).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    #[error("cannot free {0}: not a live id")]
    StaleId(ComponentId),
}

/// Allocates and recycles `(slot, generation)` identifiers for a single
/// component kind.
#[derive(Debug)]
pub struct IdAllocator {
    kind: ComponentKind,
    /// Current generation of each slot, indexed by slot number.
    generations: Vec<u32>,
    /// Slots available for reuse, most-recently-freed last.
    free: Vec<u32>,
    /// Slots whose generation counter hit `u32::MAX` and so are never
    /// reused again; the slot is retired for good rather than wrapping.
    retired: HashSet<u32>,
}

impl IdAllocator {
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            generations: Vec::new(),
            free: Vec::new(),
            retired: HashSet::new(),
        }
    }

    /// Allocate a fresh ID: a recycled slot and its bumped generation, or a
    /// brand new slot starting at generation 0.
    pub fn alloc(&mut self) -> ComponentId {
        if let Some(slot) = self.free.pop() {
            let generation = self.generations[slot as usize];
            return ComponentId::new(self.kind, slot, generation);
        }

        let slot = u32::try_from(self.generations.len()).expect("slot count exceeds u32");
        self.generations.push(0);
        ComponentId::new(self.kind, slot, 0)
    }

    /// Free a live ID, bumping its slot's generation so the old ID becomes
    /// stale, and making the slot eligible for reuse (unless the bump would
    /// overflow, in which case the slot is retired for good).
    pub fn free(&mut self, id: ComponentId) -> Result<(), IdError> {
        if !self.alive(id) {
            return Err(IdError::StaleId(id));
        }

        let slot = id.slot as usize;
        match self.generations[slot].checked_add(1) {
            Some(next) => {
                self.generations[slot] = next;
                self.free.push(id.slot);
            }
            None => {
                self.retired.insert(id.slot);
            }
        }
        Ok(())
    }

    /// Returns `true` iff `id` names a currently-live component of this
    /// allocator's kind.
    #[must_use]
    pub fn alive(&self, id: ComponentId) -> bool {
        id.kind == self.kind
            && (id.slot as usize) < self.generations.len()
            && !self.retired.contains(&id.slot)
            && self.generations[id.slot as usize] == id.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_allocations_have_unique_slots() {
        let mut alloc = IdAllocator::new(ComponentKind::Entity);
        let a = alloc.alloc();
        let b = alloc.alloc();
        assert_ne!(a.slot, b.slot);
        assert!(alloc.alive(a) && alloc.alive(b));
    }

    #[test]
    fn freeing_then_reallocating_bumps_generation() {
        let mut alloc = IdAllocator::new(ComponentKind::Entity);
        let e0 = alloc.alloc();
        assert_eq!((e0.slot, e0.generation), (0, 0));
        alloc.free(e0).unwrap();
        assert!(!alloc.alive(e0));

        let e1 = alloc.alloc();
        assert_eq!(e1.slot, 0);
        assert_eq!(e1.generation, 1);
        assert!(alloc.alive(e1));
        assert!(!alloc.alive(e0));
    }

    #[test]
    fn freeing_a_stale_id_fails() {
        let mut alloc = IdAllocator::new(ComponentKind::Entity);
        let e0 = alloc.alloc();
        alloc.free(e0).unwrap();
        assert_eq!(alloc.free(e0), Err(IdError::StaleId(e0)));
    }

    #[test]
    fn generation_monotonic_across_multiple_recycles() {
        let mut alloc = IdAllocator::new(ComponentKind::Entity);
        let mut last = alloc.alloc();
        for _ in 0..5 {
            alloc.free(last).unwrap();
            let next = alloc.alloc();
            assert_eq!(next.slot, last.slot);
            assert!(next.generation > last.generation);
            last = next;
        }
    }

    #[test]
    fn retired_slot_on_generation_overflow_is_never_reused() {
        let mut alloc = IdAllocator::new(ComponentKind::Entity);
        let mut id = alloc.alloc();
        // Fast-forward this slot's generation to the boundary without
        // churning through u32::MAX allocations.
        alloc.generations[id.slot as usize] = u32::MAX;
        id.generation = u32::MAX;
        assert!(alloc.alive(id));

        alloc.free(id).unwrap();
        assert!(!alloc.alive(id));
        assert!(alloc.free.is_empty(), "overflowed slot must not return to the free list");

        let fresh = alloc.alloc();
        assert_ne!(fresh.slot, id.slot, "retired slot must never be reissued");
    }

    #[test]
    fn different_kinds_never_alive_for_each_others_allocator() {
        let mut alloc = IdAllocator::new(ComponentKind::Entity);
        let id = alloc.alloc();
        let wrong_kind = ComponentId::new(ComponentKind::Buffer, id.slot, id.generation);
        assert!(!alloc.alive(wrong_kind));
    }
}
