//! Process-wide request spacing.
//!
//! The remote API enforces its limits per client, not per endpoint, so a
//! single [`RateGate`] sits in front of every outgoing call, retries
//! included.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;

/// Configuration for the rate gate.
///
/// ```rust
/// # use huginn::GateConfig;
/// # use std::time::Duration;
/// let config = GateConfig::new().min_interval(Duration::from_millis(500));
/// assert_eq!(config.min_interval, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Minimum spacing between two granted acquisitions. Default: 1s.
    pub min_interval: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
        }
    }
}

impl GateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum spacing between requests.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Disable spacing entirely.
    pub fn disabled() -> Self {
        Self {
            min_interval: Duration::ZERO,
        }
    }
}

/// Enforces a minimum interval between outgoing requests.
///
/// Waiters queue on a fair mutex, so grants happen in call order.
pub struct RateGate {
    min_interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            min_interval: config.min_interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Wait until a request may be sent, then record the grant.
    pub async fn acquire(&self) {
        let started = Instant::now();
        let mut last_grant = self.last_grant.lock().await;
        if let Some(last) = *last_grant {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    wait_ms = ready_at.duration_since(Instant::now()).as_millis() as u64,
                    "rate gate holding request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_grant = Some(Instant::now());
        metrics::histogram!(telemetry::RATE_GATE_WAIT_SECONDS)
            .record(started.elapsed().as_secs_f64());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}
