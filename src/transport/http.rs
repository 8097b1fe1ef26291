//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use super::Transport;
use crate::endpoint::ResolvedRequest;
use crate::error::AttemptError;
use crate::{HuginnError, Result};

/// Default base URL of the remote API.
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// HTTP settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Scheme and host (optionally a path prefix) of the API.
    pub base_url: String,
    /// `User-Agent` header. Default: `huginn/{version}`.
    pub user_agent: String,
    /// Per-attempt timeout. Default: 30s.
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: crate::version::user_agent(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Transport issuing GET requests with reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
    user_agent: String,
}

impl HttpTransport {
    /// Transport for the default API host.
    pub fn new() -> Result<Self> {
        Self::from_config(&HttpConfig::default())
    }

    /// Transport for a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&HttpConfig {
            base_url: base_url.into(),
            ..HttpConfig::default()
        })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            HuginnError::Configuration(format!("invalid base URL {}: {e}", config.base_url))
        })?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HuginnError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Full URL for a resolved request.
    pub fn url(&self, request: &ResolvedRequest) -> std::result::Result<Url, AttemptError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path))
            .map_err(|e| AttemptError::Network(format!("invalid request URL: {e}")))?;
        url.query_pairs_mut().extend_pairs(request.query.iter());
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(&self, request: &ResolvedRequest) -> std::result::Result<Value, AttemptError> {
        let url = self.url(request)?;
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::RateLimited);
        }
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AttemptError::Malformed(e.to_string()))
    }
}
