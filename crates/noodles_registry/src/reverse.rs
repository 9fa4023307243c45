//! Reverse-reference index: for each component, which other components
//! currently hold a reference to it. Backs the "can't delete something
//! still in use" rule.

use std::collections::{HashMap, HashSet};

use noodles_ids::ComponentId;

#[derive(Debug, Default)]
pub struct ReverseIndex {
    referrers: HashMap<ComponentId, HashSet<ComponentId>>,
}

impl ReverseIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, referrer: ComponentId, target: ComponentId) {
        self.referrers.entry(target).or_default().insert(referrer);
    }

    /// Drop every edge originating from `referrer` (called before an update
    /// recomputes them, or before the referrer itself is deleted).
    pub fn remove_all_from(&mut self, referrer: ComponentId) {
        for referrers in self.referrers.values_mut() {
            referrers.remove(&referrer);
        }
    }

    #[must_use]
    pub fn is_referenced(&self, target: ComponentId) -> bool {
        self.referrers
            .get(&target)
            .is_some_and(|set| !set.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_ids::ComponentKind;

    fn id(slot: u32) -> ComponentId {
        ComponentId::new(ComponentKind::Entity, slot, 0)
    }

    #[test]
    fn unreferenced_target_is_not_in_use() {
        let idx = ReverseIndex::new();
        assert!(!idx.is_referenced(id(0)));
    }

    #[test]
    fn referenced_target_is_in_use() {
        let mut idx = ReverseIndex::new();
        idx.add(id(1), id(0));
        assert!(idx.is_referenced(id(0)));
    }

    #[test]
    fn removing_referrer_edges_clears_in_use() {
        let mut idx = ReverseIndex::new();
        idx.add(id(1), id(0));
        idx.remove_all_from(id(1));
        assert!(!idx.is_referenced(id(0)));
    }
}
