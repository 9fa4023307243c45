//! # noodles_math
//!
//! Spatial math helpers for the NOODLES scene registry. Re-exports [`glam`]
//! for linear algebra and defines the row-major transform conversion the
//! wire protocol needs.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use transform::{from_mat4, is_finite, to_mat4, RowMajorTransform, IDENTITY};
