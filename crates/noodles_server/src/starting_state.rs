//! The initial document a server boots with: whatever entities, buffers,
//! tables, and other components the embedding application wants present
//! before the first client ever connects.

use noodles_registry::{Registry, RegistryError};

/// A closure that populates a freshly created [`Registry`]. Applied
/// through the registry's normal `create_*` methods, so a starting state
/// with a dangling reference or an invalid field fails `build()` with the
/// same error a client would get for the same mistake at runtime, rather
/// than producing a document that's broken from the first frame.
pub struct StartingState {
    setup: Box<dyn FnOnce(&mut Registry) -> Result<(), RegistryError> + Send>,
}

impl StartingState {
    pub fn new(setup: impl FnOnce(&mut Registry) -> Result<(), RegistryError> + Send + 'static) -> Self {
        Self {
            setup: Box::new(setup),
        }
    }

    /// An empty starting state: no components beyond whatever the server
    /// itself always creates.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(|_registry| Ok(()))
    }

    pub(crate) fn apply(self, registry: &mut Registry) -> Result<(), RegistryError> {
        (self.setup)(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_wire::records::BufferRecord;

    #[test]
    fn empty_starting_state_leaves_registry_empty() {
        let mut registry = Registry::new();
        StartingState::empty().apply(&mut registry).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn custom_starting_state_populates_the_registry() {
        let mut registry = Registry::new();
        StartingState::new(|registry| {
            registry.create_buffer(BufferRecord {
                name: Some("seed".into()),
                size: 4,
                source: noodles_wire::records::BufferSource::InlineBytes {
                    inline_bytes: vec![0; 4],
                },
            });
            Ok(())
        })
        .apply(&mut registry)
        .unwrap();
        assert_eq!(registry.len(), 1);
    }
}
