use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://dwani-amoghavarsha.hf.space";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub bind_addr: SocketAddr,
    pub provider_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("DWANI_API_KEY").filter(|key| !key.trim().is_empty());
        match &api_key {
            Some(_) => info!("Dwani API key loaded"),
            None => warn!("DWANI_API_KEY not set; chat requests will fail until it is configured"),
        }

        let base_url = lookup("DWANI_API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let bind_addr = lookup("SARATHI_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("SARATHI_BIND_ADDR is not a socket address: {bind_addr}"))?;

        let timeout_secs = match lookup("SARATHI_PROVIDER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().with_context(|| {
                    format!("SARATHI_PROVIDER_TIMEOUT_SECS must be an integer, got {raw:?}")
                })?;
                if secs == 0 {
                    bail!("SARATHI_PROVIDER_TIMEOUT_SECS must be positive");
                }
                secs
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url,
            bind_addr,
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
