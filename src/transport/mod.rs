//! Network boundary.
//!
//! [`Transport`] performs one attempt of one resolved request and classifies
//! its failure. [`HttpTransport`] is the reqwest-backed implementation;
//! tests substitute their own. Retrying is layered on top by
//! [`retry::with_retry`].

pub mod http;
pub mod retry;

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::ResolvedRequest;
use crate::error::AttemptError;

pub use http::{DEFAULT_BASE_URL, HttpConfig, HttpTransport};
pub use retry::{RetryConfig, with_retry};

/// Single-attempt GET against the remote API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &str;

    /// Issue the request once and return the decoded JSON body.
    ///
    /// Implementations map HTTP 429 to [`AttemptError::RateLimited`], other
    /// non-2xx statuses to [`AttemptError::Status`], connection failures to
    /// [`AttemptError::Network`] and undecodable bodies to
    /// [`AttemptError::Malformed`]. Shape validation happens in the caller.
    async fn get(&self, request: &ResolvedRequest) -> Result<Value, AttemptError>;
}
