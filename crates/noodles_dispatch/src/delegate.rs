//! Per-kind delegate layer: lets server code swap in custom behaviour for a
//! component without touching the dispatcher itself. Tables are the one
//! kind with a standard capability set worth naming as a trait, since
//! insert/update/remove/clear/update-selection are the operations every
//! NOODLES table client expects to invoke.

use std::collections::HashMap;

use noodles_ids::ComponentId;
use noodles_wire::records::{Selection, TableKey, TableRow};
use noodles_wire::MethodException;

/// The mutation capability set a table's delegate exposes. A table created
/// without a delegate accepts no row mutations — its rows are implicitly
/// whatever the creator chose never to make editable.
pub trait TableOps: Send + Sync {
    fn insert(&mut self, rows: Vec<TableRow>) -> Result<Vec<TableKey>, MethodException>;
    fn update(&mut self, keys: Vec<TableKey>, rows: Vec<TableRow>) -> Result<(), MethodException>;
    fn remove(&mut self, keys: Vec<TableKey>) -> Result<(), MethodException>;
    fn clear(&mut self) -> Result<(), MethodException>;
    fn update_selection(&mut self, selection: Selection) -> Result<(), MethodException>;
}

/// Constructs a table's delegate at creation time. Server setup code
/// implements this once and hands it to the builder; the dispatcher calls
/// it whenever a new table component is created.
pub trait DelegateFactory: Send + Sync {
    fn create_table_delegate(&self, table_id: ComponentId) -> Option<Box<dyn TableOps>>;
}

/// Live per-table delegate instances, keyed by the table's component id.
#[derive(Default)]
pub struct DelegateRegistry {
    tables: HashMap<ComponentId, Box<dyn TableOps>>,
}

impl DelegateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table_delegate(&mut self, table_id: ComponentId, delegate: Box<dyn TableOps>) {
        self.tables.insert(table_id, delegate);
    }

    pub fn table_delegate_mut(&mut self, table_id: ComponentId) -> Option<&mut dyn TableOps> {
        self.tables.get_mut(&table_id).map(std::convert::AsMut::as_mut)
    }

    pub fn remove_table_delegate(&mut self, table_id: ComponentId) {
        self.tables.remove(&table_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_ids::ComponentKind;

    struct NullOps;
    impl TableOps for NullOps {
        fn insert(&mut self, _rows: Vec<TableRow>) -> Result<Vec<TableKey>, MethodException> {
            Ok(vec![])
        }
        fn update(&mut self, _keys: Vec<TableKey>, _rows: Vec<TableRow>) -> Result<(), MethodException> {
            Ok(())
        }
        fn remove(&mut self, _keys: Vec<TableKey>) -> Result<(), MethodException> {
            Ok(())
        }
        fn clear(&mut self) -> Result<(), MethodException> {
            Ok(())
        }
        fn update_selection(&mut self, _selection: Selection) -> Result<(), MethodException> {
            Ok(())
        }
    }

    #[test]
    fn unregistered_table_has_no_delegate() {
        let mut reg = DelegateRegistry::new();
        let id = ComponentId::new(ComponentKind::Table, 0, 0);
        assert!(reg.table_delegate_mut(id).is_none());
    }

    #[test]
    fn registered_delegate_is_retrievable_and_removable() {
        let mut reg = DelegateRegistry::new();
        let id = ComponentId::new(ComponentKind::Table, 0, 0);
        reg.set_table_delegate(id, Box::new(NullOps));
        assert!(reg.table_delegate_mut(id).is_some());
        reg.remove_table_delegate(id);
        assert!(reg.table_delegate_mut(id).is_none());
    }
}
