//! Command line configuration for the server binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = shared::DEFAULT_PORT)]
    pub port: u16,

    /// Map file to load at startup
    #[arg(short, long, default_value = "mapa.txt")]
    pub map: PathBuf,

    /// Keep a connection's players in the world after it closes
    #[arg(long)]
    pub keep_players_on_drop: bool,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: shared::DEFAULT_PORT,
            map: PathBuf::from("mapa.txt"),
            keep_players_on_drop: false,
        }
    }
}
