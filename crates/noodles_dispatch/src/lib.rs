//! # noodles_dispatch
//!
//! Method invocation for the NOODLES scene server: context resolution,
//! handler lookup, and the per-kind delegate layer (most notably table
//! row mutation) that server setup code plugs into.

pub mod context;
pub mod delegate;
pub mod dispatcher;
pub mod error;
pub mod handler;

pub use context::Context;
pub use delegate::{DelegateFactory, DelegateRegistry, TableOps};
pub use dispatcher::MethodDispatcher;
pub use error::DispatchError;
pub use handler::{HandlerOutcome, MethodHandler};
