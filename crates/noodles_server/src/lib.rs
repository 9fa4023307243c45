//! Library surface for the NOODLES server: everything `main.rs` and the
//! integration tests need to assemble and drive a [`Server`].

mod broadcast;
mod config;
mod server;
mod session;
mod starting_state;

mod builder;

pub use builder::ServerBuilder;
pub use config::ServerConfig;
pub use server::Server;
pub use session::{SessionError, SessionId, SessionState};
pub use starting_state::StartingState;
