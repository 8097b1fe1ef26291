//! Builder for configuring client instances

use std::sync::Arc;
use std::time::Duration;

use super::RequestClient;
use crate::Result;
use crate::cache::{CacheConfig, ResponseCache};
use crate::gate::{GateConfig, RateGate};
use crate::transport::{HttpConfig, HttpTransport, RetryConfig, Transport};

/// Main entry point for creating client instances.
pub struct Huginn;

impl Huginn {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

/// Builder for configuring client instances.
pub struct ClientBuilder {
    http: HttpConfig,
    cache: CacheConfig,
    retry: RetryConfig,
    gate: GateConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            gate: GateConfig::default(),
            transport: None,
        }
    }

    /// Point the client at a different API host.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.http.base_url = url.into();
        self
    }

    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.http.user_agent = agent.into();
        self
    }

    /// Set the per-attempt HTTP timeout (seconds).
    pub fn timeout(mut self, secs: u64) -> Self {
        self.http.timeout = Duration::from_secs(secs);
        self
    }

    /// Configure the response cache.
    pub fn response_cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Configure retry behaviour.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Configure request spacing.
    pub fn rate_gate(mut self, config: GateConfig) -> Self {
        self.gate = config;
        self
    }

    /// Use a custom transport instead of HTTP.
    ///
    /// HTTP settings (`base_url`, `user_agent`, `timeout`) are ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RequestClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::from_config(&self.http)?),
        };

        Ok(RequestClient::new(
            transport,
            Arc::new(RateGate::new(&self.gate)),
            ResponseCache::new(&self.cache),
            self.retry,
        ))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
