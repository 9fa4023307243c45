//! Server configuration, parsed from the command line (with environment
//! variable fallbacks) the way a small standalone binary typically is.

use std::path::PathBuf;

use clap::Parser;

/// Runtime configuration for the NOODLES server binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "noodles_server", about = "Authoritative NOODLES scene server")]
pub struct ServerConfig {
    /// TCP port to accept websocket connections on.
    #[arg(long, env = "NOODLES_PORT", default_value_t = 50000)]
    pub port: u16,

    /// If set, every outbound frame batch is also appended as JSON to this
    /// file, for offline protocol inspection.
    #[arg(long, env = "NOODLES_JSON_DUMP")]
    pub json_dump_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 50000,
            json_dump_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_port() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 50000);
        assert!(config.json_dump_path.is_none());
    }
}
