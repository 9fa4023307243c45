//! `noodles_server` — a single-process, single-writer authoritative server
//! for the NOODLES collaborative scene protocol.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use noodles_server::{ServerBuilder, ServerConfig, StartingState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("noodles_server=info".parse()?))
        .init();

    let config = ServerConfig::parse();
    info!(port = config.port, "noodles server starting");

    let server = ServerBuilder::new(config)
        .with_starting_state(StartingState::empty())
        .build()?;

    server.run().await?;

    info!("noodles server shut down");
    Ok(())
}
