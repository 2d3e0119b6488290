use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::store::AutosavePolicy;

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub rust_log: String,
    pub autosave_policy: AutosavePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            data_file: PathBuf::from(var("VITAE_DATA_FILE", "vitae-data.json")),
            bind_addr: var("BIND_ADDR", "127.0.0.1")
                .parse::<IpAddr>()
                .context("BIND_ADDR must be a valid IP address")?,
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            autosave_policy: var("AUTOSAVE_POLICY", "content-changed")
                .parse::<AutosavePolicy>()
                .map_err(anyhow::Error::msg)
                .context("AUTOSAVE_POLICY is invalid")?,
        })
    }
}
