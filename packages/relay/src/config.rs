use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Hub configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (`RELAY_PORT`, default 3000).
    pub port: u16,
    /// Advertised WebSocket address override (`RELAY_ADVERTISE_ADDR`).
    /// Detected from the LAN interface when unset.
    pub advertise_addr: Option<String>,
    /// SQLite connection URL (`DATABASE_URL`). In-memory store when unset
    /// or when the `sqlite` feature is off.
    pub database_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("RELAY_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("RELAY_PORT must be a valid port number")?,
            advertise_addr: env::var("RELAY_ADVERTISE_ADDR").ok(),
            database_url: env::var("DATABASE_URL").ok(),
        })
    }
}
