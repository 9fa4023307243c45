//! The scope a method invocation is running against.

use noodles_ids::ComponentId;

/// Where a method call is addressed: the document as a whole, or a
/// specific entity/table/plot that scopes what the handler may act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Global,
    Entity(ComponentId),
    Table(ComponentId),
    Plot(ComponentId),
}

impl Context {
    /// The component the context is scoped to, or `None` for [`Context::Global`].
    #[must_use]
    pub fn component(&self) -> Option<ComponentId> {
        match self {
            Context::Global => None,
            Context::Entity(id) | Context::Table(id) | Context::Plot(id) => Some(*id),
        }
    }
}
