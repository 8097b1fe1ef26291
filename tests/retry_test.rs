use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use huginn::transport::with_retry;
use huginn::{AttemptError, HuginnError, RetryConfig};
use serde_json::{Value, json};
use tokio::time::Instant;

/// Scripted attempt source: replays `script`, then keeps succeeding.
struct Script {
    steps: Vec<Result<Value, AttemptError>>,
    calls: AtomicU32,
}

impl Script {
    fn new(steps: Vec<Result<Value, AttemptError>>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            calls: AtomicU32::new(0),
        })
    }

    fn always(err: AttemptError) -> Arc<Self> {
        Self::new(vec![Err(err); 16])
    }

    async fn attempt(&self) -> Result<Value, AttemptError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        self.steps.get(n).cloned().unwrap_or_else(|| Ok(ok_listing()))
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

fn ok_listing() -> Value {
    json!({"kind": "Listing", "data": {"after": null, "children": [{"kind": "t3", "data": {"id": "a"}}]}})
}

async fn run(config: &RetryConfig, script: &Arc<Script>) -> huginn::Result<Value> {
    with_retry(config, "test", || script.attempt()).await
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test(start_paused = true)]
async fn persistent_rate_limit_gives_three_attempts() {
    let script = Script::always(AttemptError::RateLimited);
    let err = run(&RetryConfig::default(), &script).await.unwrap_err();

    assert_eq!(err, HuginnError::RateLimitExceeded { attempts: 3 });
    assert_eq!(script.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_then_success_waits_between_attempts() {
    let script = Script::new(vec![
        Err(AttemptError::RateLimited),
        Err(AttemptError::RateLimited),
    ]);
    let start = Instant::now();
    let payload = run(&RetryConfig::default(), &script).await.unwrap();

    assert_eq!(payload, ok_listing());
    assert_eq!(script.call_count(), 3);
    assert!(start.elapsed() >= Duration::from_secs(2));
}

// ============================================================================
// Transport failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn persistent_server_error_is_request_failed() {
    let script = Script::always(AttemptError::Status(503));
    let err = run(&RetryConfig::default(), &script).await.unwrap_err();

    match err {
        HuginnError::RequestFailed { cause } => assert!(cause.contains("503")),
        other => panic!("expected RequestFailed, got {other:?}"),
    }
    assert_eq!(script.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn transport_retry_uses_shorter_delay() {
    let script = Script::new(vec![Err(AttemptError::Network("reset".into()))]);
    let start = Instant::now();
    run(&RetryConfig::default(), &script).await.unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn malformed_payload_exhausts_to_invalid_response() {
    let script = Script::always(AttemptError::Malformed("no children".into()));
    let err = run(&RetryConfig::default(), &script).await.unwrap_err();

    assert!(matches!(err, HuginnError::InvalidResponse(_)));
    assert_eq!(script.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn mixed_failures_share_the_overall_cap() {
    // alternating 429 and 5xx still stops after 1 + 2 attempts
    let script = Script::new(vec![
        Err(AttemptError::RateLimited),
        Err(AttemptError::Status(502)),
        Err(AttemptError::RateLimited),
        Err(AttemptError::Network("reset".into())),
    ]);
    let err = run(&RetryConfig::default(), &script).await.unwrap_err();

    assert_eq!(err, HuginnError::RateLimitExceeded { attempts: 3 });
    assert_eq!(script.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn class_budget_still_applies_under_a_larger_cap() {
    // the cap is 4, but 429s alone may only be retried once
    let config = RetryConfig::new().rate_limit_retries(1).transport_retries(4);
    let script = Script::always(AttemptError::RateLimited);
    let err = run(&config, &script).await.unwrap_err();

    assert_eq!(err, HuginnError::RateLimitExceeded { attempts: 2 });
    assert_eq!(script.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn last_failure_decides_the_error() {
    let script = Script::new(vec![
        Err(AttemptError::RateLimited),
        Err(AttemptError::Status(500)),
        Err(AttemptError::Status(500)),
    ]);
    let err = run(&RetryConfig::default(), &script).await.unwrap_err();
    assert!(matches!(err, HuginnError::RequestFailed { .. }));
    assert_eq!(script.call_count(), 3);
}

// ============================================================================
// No retry cases
// ============================================================================

#[tokio::test(start_paused = true)]
async fn empty_listing_is_not_retried() {
    let empty = json!({"kind": "Listing", "data": {"after": null, "children": []}});
    let script = Script::new(vec![Ok(empty.clone())]);
    let payload = run(&RetryConfig::default(), &script).await.unwrap();

    assert_eq!(payload, empty);
    assert_eq!(script.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn disabled_config_makes_one_attempt() {
    let script = Script::always(AttemptError::RateLimited);
    let err = run(&RetryConfig::disabled(), &script).await.unwrap_err();

    assert_eq!(err, HuginnError::RateLimitExceeded { attempts: 1 });
    assert_eq!(script.call_count(), 1);
}

#[test]
fn retry_config_builder() {
    let config = RetryConfig::new()
        .rate_limit_retries(5)
        .rate_limit_delay(Duration::from_secs(2))
        .transport_retries(1)
        .transport_delay(Duration::from_millis(100));
    assert_eq!(config.rate_limit_retries, 5);
    assert_eq!(config.rate_limit_delay, Duration::from_secs(2));
    assert_eq!(config.transport_retries, 1);
    assert_eq!(config.transport_delay, Duration::from_millis(100));
}
