//! Time-bounded response cache.
//!
//! [`ResponseCache`] maps a [`RequestKey`] to the validated payload of its
//! last successful fetch. Entries are served while younger than the
//! configured TTL and are replaced wholesale by the next successful fetch
//! after they go stale; a stale read is simply a miss.
//!
//! Payloads are stored as `Arc<Value>`, so every hit hands out the same
//! allocation as the fetch that populated it.
//!
//! By default there is no size bound. A browsing session is short and the
//! working set small; set [`CacheConfig::max_entries`] for long-running
//! processes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

use crate::endpoint::RequestKey;

/// Configuration for the response cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .ttl(Duration::from_secs(30))
///     .max_entries(1_000);
/// assert_eq!(config.max_entries, Some(1_000));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window for cached entries. Default: 2 minutes.
    pub ttl: Duration,
    /// Optional capacity bound. Default: unbounded.
    pub max_entries: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(120),
            max_entries: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the freshness window.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Bound the number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = Some(n);
        self
    }
}

/// In-memory TTL cache of validated response payloads.
///
/// Cheap to clone; clones share the same storage.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<RequestKey, Arc<Value>>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().time_to_live(config.ttl);
        if let Some(max) = config.max_entries {
            builder = builder.max_capacity(max);
        }
        Self {
            cache: builder.build(),
        }
    }

    /// Look up a fresh payload. Stale or missing entries return `None`.
    pub async fn get(&self, key: &RequestKey) -> Option<Arc<Value>> {
        self.cache.get(key).await
    }

    /// Store a payload, overwriting any previous entry for `key`.
    pub async fn put(&self, key: RequestKey, payload: Arc<Value>) {
        self.cache.insert(key, payload).await;
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of stored entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
