//! Caching subsystem.
//!
//! Two cooperating structures, both owned by one
//! [`RequestClient`](crate::RequestClient):
//!
//! - [`response::ResponseCache`]: TTL cache of validated payloads, consulted
//!   before anything else. A hit costs no network call and no rate-gate slot.
//!
//! - [`inflight::InFlightRegistry`]: coalesces concurrent misses for the
//!   same key onto a single network call.

pub mod inflight;
pub mod response;

pub use inflight::{Fetch, InFlightRegistry, Pending, SharedFetch};
pub use response::{CacheConfig, ResponseCache};
