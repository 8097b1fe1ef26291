//! Retry configuration and the bounded retry loop.
//!
//! Failures fall into two budgets:
//!
//! - **rate limited** (HTTP 429): retried after a fixed, longer delay;
//!   exhaustion yields [`HuginnError::RateLimitExceeded`].
//! - **transport** (network errors, unexpected statuses, malformed 2xx
//!   payloads): retried after a shorter delay; exhaustion yields
//!   [`HuginnError::RequestFailed`], or [`HuginnError::InvalidResponse`] when
//!   the last failure was a malformed payload.
//!
//! Each budget is counted independently, and the total number of retries is
//! capped at the larger of the two. A well-formed empty listing is a success
//! and is never retried.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{AttemptError, FailureClass};
use crate::{HuginnError, Result, telemetry};

/// Configuration for retry behaviour on transient errors.
///
/// ```rust
/// # use huginn::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .rate_limit_retries(3)
///     .transport_delay(Duration::from_millis(200));
/// assert_eq!(config.rate_limit_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after a 429, not counting the initial request. Default: 2.
    pub rate_limit_retries: u32,
    /// Delay before retrying a 429. Default: 1s.
    pub rate_limit_delay: Duration,
    /// Retries after a transport failure or malformed payload. Default: 2.
    pub transport_retries: u32,
    /// Delay before retrying a transport failure. Default: 500ms.
    pub transport_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            rate_limit_retries: 2,
            rate_limit_delay: Duration::from_secs(1),
            transport_retries: 2,
            transport_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            rate_limit_retries: 0,
            transport_retries: 0,
            ..Self::default()
        }
    }

    pub fn rate_limit_retries(mut self, n: u32) -> Self {
        self.rate_limit_retries = n;
        self
    }

    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    pub fn transport_retries(mut self, n: u32) -> Self {
        self.transport_retries = n;
        self
    }

    pub fn transport_delay(mut self, delay: Duration) -> Self {
        self.transport_delay = delay;
        self
    }

    /// Retry budget and delay for a failure class.
    pub fn budget(&self, class: FailureClass) -> (u32, Duration) {
        match class {
            FailureClass::RateLimited => (self.rate_limit_retries, self.rate_limit_delay),
            FailureClass::Transport | FailureClass::Malformed => {
                (self.transport_retries, self.transport_delay)
            }
        }
    }
}

/// Run `attempt` until it succeeds, its failure class runs out of retries,
/// or the overall retry cap is reached.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    let mut rate_limit_retries = 0u32;
    let mut transport_retries = 0u32;
    let mut attempts = 0u32;
    // Classes share one overall cap, so a remote alternating 429s and 5xx
    // still gets at most `1 + max(budgets)` attempts.
    let total_budget = config.rate_limit_retries.max(config.transport_retries);

    loop {
        attempts += 1;
        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let class = err.class();
        let (budget, delay) = config.budget(class);
        let retried = rate_limit_retries + transport_retries;
        let used = match class {
            FailureClass::RateLimited => &mut rate_limit_retries,
            FailureClass::Transport | FailureClass::Malformed => &mut transport_retries,
        };
        if *used >= budget || retried >= total_budget {
            return Err(exhausted(err, attempts));
        }
        *used += 1;

        metrics::counter!(telemetry::RETRIES_TOTAL, "class" => class_label(class)).increment(1);
        warn!(
            operation,
            attempt = attempts,
            class = class_label(class),
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying after transient error"
        );
        tokio::time::sleep(delay).await;
    }
}

fn exhausted(err: AttemptError, attempts: u32) -> HuginnError {
    match err {
        AttemptError::RateLimited => HuginnError::RateLimitExceeded { attempts },
        AttemptError::Malformed(message) => HuginnError::InvalidResponse(message),
        other => HuginnError::RequestFailed {
            cause: other.to_string(),
        },
    }
}

fn class_label(class: FailureClass) -> &'static str {
    match class {
        FailureClass::RateLimited => "rate_limited",
        FailureClass::Transport => "transport",
        FailureClass::Malformed => "malformed",
    }
}
