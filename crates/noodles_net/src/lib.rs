//! # noodles_net
//!
//! Websocket transport for the NOODLES collaborative scene server.
//!
//! This crate provides:
//!
//! - [`connection`] — per-client framed websocket connection.
//! - [`error`] — transport-layer error types.

pub mod connection;
pub mod error;

pub use connection::{Connection, Reader, Writer};
pub use error::NetError;
