//! The fixed set of component kinds the registry stores.
//!
//! A NOODLES "component" *is* the top-level object (a `Method`, a `Buffer`,
//! an `Entity`, ...) rather than a fragment composed onto one. Each kind
//! gets its own indexed table in the registry.

use serde::{Deserialize, Serialize};

/// One of the thirteen component kinds defined by the NOODLES scene protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Method,
    Signal,
    Entity,
    Plot,
    Buffer,
    BufferView,
    Material,
    Image,
    Texture,
    Sampler,
    Light,
    Geometry,
    Table,
}

impl ComponentKind {
    /// All kinds, in the dependency order `snapshot()` must emit them in:
    /// buffers before buffer views, before images/geometries; samplers
    /// before textures; textures before materials; materials and
    /// geometries before entities; tables before plots.
    pub const SNAPSHOT_ORDER: [ComponentKind; 13] = [
        ComponentKind::Buffer,
        ComponentKind::BufferView,
        ComponentKind::Sampler,
        ComponentKind::Image,
        ComponentKind::Texture,
        ComponentKind::Material,
        ComponentKind::Geometry,
        ComponentKind::Light,
        ComponentKind::Table,
        ComponentKind::Plot,
        ComponentKind::Entity,
        ComponentKind::Method,
        ComponentKind::Signal,
    ];

    /// A short, stable name used in log fields and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Method => "method",
            ComponentKind::Signal => "signal",
            ComponentKind::Entity => "entity",
            ComponentKind::Plot => "plot",
            ComponentKind::Buffer => "buffer",
            ComponentKind::BufferView => "buffer_view",
            ComponentKind::Material => "material",
            ComponentKind::Image => "image",
            ComponentKind::Texture => "texture",
            ComponentKind::Sampler => "sampler",
            ComponentKind::Light => "light",
            ComponentKind::Geometry => "geometry",
            ComponentKind::Table => "table",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_order_is_a_permutation_of_all_kinds() {
        let mut order = ComponentKind::SNAPSHOT_ORDER.to_vec();
        order.sort();
        let mut all = vec![
            ComponentKind::Method,
            ComponentKind::Signal,
            ComponentKind::Entity,
            ComponentKind::Plot,
            ComponentKind::Buffer,
            ComponentKind::BufferView,
            ComponentKind::Material,
            ComponentKind::Image,
            ComponentKind::Texture,
            ComponentKind::Sampler,
            ComponentKind::Light,
            ComponentKind::Geometry,
            ComponentKind::Table,
        ];
        all.sort();
        assert_eq!(order, all);
    }

    #[test]
    fn buffer_precedes_buffer_view_precedes_image() {
        let pos = |k: ComponentKind| {
            ComponentKind::SNAPSHOT_ORDER
                .iter()
                .position(|&x| x == k)
                .unwrap()
        };
        assert!(pos(ComponentKind::Buffer) < pos(ComponentKind::BufferView));
        assert!(pos(ComponentKind::BufferView) < pos(ComponentKind::Image));
        assert!(pos(ComponentKind::Sampler) < pos(ComponentKind::Texture));
        assert!(pos(ComponentKind::Texture) < pos(ComponentKind::Material));
        assert!(pos(ComponentKind::Material) < pos(ComponentKind::Entity));
        assert!(pos(ComponentKind::Table) < pos(ComponentKind::Plot));
    }
}
