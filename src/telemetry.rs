//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation`: fetch operation (e.g. "listing", "search", "thread")
//! - `status`: outcome: "ok" or "error"
//! - `class`: retry class: "rate_limited", "transport" or "malformed"

/// Network calls issued (one per coalesced request, retries excluded).
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// Duration of a network call including retries, in seconds.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "huginn_request_duration_seconds";

/// Retry attempts (not counting the initial request).
///
/// Labels: `class`.
pub const RETRIES_TOTAL: &str = "huginn_retries_total";

/// Response cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Response cache misses.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Callers that joined an already in-flight request instead of issuing one.
///
/// Labels: `operation`.
pub const COALESCED_TOTAL: &str = "huginn_coalesced_total";

/// Time spent waiting at the rate gate, in seconds.
pub const RATE_GATE_WAIT_SECONDS: &str = "huginn_rate_gate_wait_seconds";
