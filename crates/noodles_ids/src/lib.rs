//! # noodles_ids
//!
//! Typed component identifiers and per-kind ID allocation for the NOODLES
//! scene registry.
//!
//! This crate provides:
//!
//! - [`ComponentKind`] — the fixed set of component kinds the registry stores.
//! - [`ComponentId`] — a `(kind, slot, generation)` identifier.
//! - [`IdAllocator`] — per-kind slot allocation with generation-based reuse.

pub mod alloc;
pub mod id;
pub mod kind;

pub use alloc::{IdAllocator, IdError};
pub use id::ComponentId;
pub use kind::ComponentKind;
