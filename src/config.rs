//! Configuration file for the `huginn` binary.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//!
//! A missing file is not an error; every setting has a default.
//!
//! ```toml
//! [http]
//! base_url = "https://www.reddit.com"
//! timeout_secs = 30
//!
//! [cache]
//! ttl_secs = 120
//!
//! [rate_gate]
//! min_interval_ms = 1000
//!
//! [retry]
//! rate_limit_retries = 2
//! rate_limit_delay_ms = 1000
//! transport_retries = 2
//! transport_delay_ms = 500
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::client::ClientBuilder;
use crate::gate::GateConfig;
use crate::transport::{DEFAULT_BASE_URL, RetryConfig};
use crate::{HuginnError, Result};

/// Client configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub rate_gate: RateGateSection,
    #[serde(default)]
    pub retry: RetrySection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSection {
    /// API base URL (default: https://www.reddit.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Override for the `User-Agent` header.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Per-attempt timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Freshness window in seconds (default: 120).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default)]
    pub max_entries: Option<u64>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: None,
        }
    }
}

fn default_ttl() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateGateSection {
    /// Minimum spacing between requests in milliseconds (default: 1000).
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
}

impl Default for RateGateSection {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval(),
        }
    }
}

fn default_min_interval() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_retries")]
    pub rate_limit_retries: u32,
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_ms: u64,
    #[serde(default = "default_retries")]
    pub transport_retries: u32,
    #[serde(default = "default_transport_delay")]
    pub transport_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            rate_limit_retries: default_retries(),
            rate_limit_delay_ms: default_rate_limit_delay(),
            transport_retries: default_retries(),
            transport_delay_ms: default_transport_delay(),
        }
    }
}

fn default_retries() -> u32 {
    2
}

fn default_rate_limit_delay() -> u64 {
    1000
}

fn default_transport_delay() -> u64 {
    500
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist; the default locations are optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/huginn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply this configuration to a client builder.
    pub fn apply(&self, mut builder: ClientBuilder) -> ClientBuilder {
        builder = builder
            .base_url(self.http.base_url.clone())
            .timeout(self.http.timeout_secs);
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let mut cache = CacheConfig::new().ttl(Duration::from_secs(self.cache.ttl_secs));
        if let Some(max) = self.cache.max_entries {
            cache = cache.max_entries(max);
        }

        builder
            .response_cache(cache)
            .rate_gate(
                GateConfig::new()
                    .min_interval(Duration::from_millis(self.rate_gate.min_interval_ms)),
            )
            .retry(
                RetryConfig::new()
                    .rate_limit_retries(self.retry.rate_limit_retries)
                    .rate_limit_delay(Duration::from_millis(self.retry.rate_limit_delay_ms))
                    .transport_retries(self.retry.transport_retries)
                    .transport_delay(Duration::from_millis(self.retry.transport_delay_ms)),
            )
    }
}
