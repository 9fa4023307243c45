//! # noodles_registry
//!
//! The authoritative, in-memory component registry for the NOODLES scene
//! server: per-kind storage with generation-checked ids, reference
//! validation, a reverse-reference index backing the delete-while-in-use
//! rule, and document snapshotting for newly joined clients.

pub mod delta;
pub mod error;
pub mod refs;
pub mod registry;
pub mod reverse;
pub mod table;

pub use error::RegistryError;
pub use registry::Registry;
