//! Request client: the orchestrator.
//!
//! Every fetch follows the same path:
//!
//! 1. resolve the descriptor to a path, query and [`RequestKey`];
//! 2. serve a fresh cached payload if there is one (no network, no rate gate);
//! 3. otherwise join the in-flight call for the key, or start one;
//! 4. the call acquires the rate gate before every attempt, runs the
//!    transport inside the retry loop, and caches the payload on success.
//!
//! Failures are never cached and never retried here; retrying belongs to
//! [`with_retry`] alone.
//!
//! # Cancellation
//!
//! Each caller owns its own cancellation. Dropping a fetch future, or
//! cancelling the token passed to one of the `*_cancellable` methods, only
//! detaches that caller. The network call keeps running while anyone else
//! awaits it, and is aborted once nobody does.

mod builder;

pub use builder::{ClientBuilder, Huginn};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{Fetch, InFlightRegistry, ResponseCache};
use crate::endpoint::{RequestKey, Resolution, ResolvedRequest, resolve};
use crate::error::AttemptError;
use crate::gate::RateGate;
use crate::transport::{RetryConfig, Transport, with_retry};
use crate::types::{
    CommunityListingRequest, ListingRequest, Request, SearchRequest, ThreadRequest,
    empty_listing,
};
use crate::{HuginnError, Result, telemetry};

/// Caching, coalescing, rate-limited client for the remote listing API.
///
/// Cheap to clone; clones share the cache, the in-flight registry and the
/// rate gate. Build one per process with [`Huginn::builder()`] and hand out
/// clones or references.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    gate: Arc<RateGate>,
    cache: ResponseCache,
    inflight: InFlightRegistry,
    retry: RetryConfig,
    /// Bumped by [`clear_cache`](Self::clear_cache); calls started under an
    /// older epoch do not write to the cache.
    epoch: Arc<AtomicU64>,
}

impl RequestClient {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        gate: Arc<RateGate>,
        cache: ResponseCache,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            gate,
            cache,
            inflight: InFlightRegistry::new(),
            retry,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Paginated section listing.
    pub async fn fetch_listing(&self, request: &ListingRequest) -> Result<Arc<Value>> {
        self.fetch(&Request::Listing(request.clone())).await
    }

    /// Keyword search over posts. Blank queries return an empty listing.
    pub async fn fetch_search_results(&self, request: &SearchRequest) -> Result<Arc<Value>> {
        self.fetch(&Request::Search(request.clone())).await
    }

    /// Typeahead community search.
    pub async fn fetch_community_suggestions(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Arc<Value>> {
        self.fetch(&Request::CommunitySuggestions {
            query: query.to_string(),
            limit,
        })
        .await
    }

    /// A community's `about` page.
    pub async fn fetch_community_info(&self, community: &str) -> Result<Arc<Value>> {
        self.fetch(&Request::CommunityInfo {
            community: community.to_string(),
        })
        .await
    }

    /// Paginated listing of one community.
    pub async fn fetch_community_listing(
        &self,
        request: &CommunityListingRequest,
    ) -> Result<Arc<Value>> {
        self.fetch(&Request::CommunityListing(request.clone())).await
    }

    /// A post and its comment tree.
    pub async fn fetch_thread_detail(&self, request: &ThreadRequest) -> Result<Arc<Value>> {
        self.fetch(&Request::Thread(request.clone())).await
    }

    /// Currently popular communities.
    pub async fn fetch_popular_communities(&self, limit: u32) -> Result<Arc<Value>> {
        self.fetch(&Request::PopularCommunities { limit }).await
    }

    /// Fetch any request.
    pub async fn fetch(&self, request: &Request) -> Result<Arc<Value>> {
        self.run(request, None).await
    }

    /// Fetch any request, giving up with [`HuginnError::Cancelled`] once
    /// `cancel` fires.
    pub async fn fetch_cancellable(
        &self,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<Arc<Value>> {
        self.run(request, Some(cancel)).await
    }

    /// Drop every cached payload and in-flight registration.
    ///
    /// The next request for any key issues a new network call. Calls already
    /// running still answer their own callers but no longer fill the cache.
    pub fn clear_cache(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cache.clear();
        self.inflight.clear();
        info!("response cache cleared");
    }

    /// Whether a network call for `key` is currently registered.
    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        self.inflight.contains(key)
    }

    /// The rate gate shared by every request from this client.
    pub fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    async fn run(
        &self,
        request: &Request,
        cancel: Option<&CancellationToken>,
    ) -> Result<Arc<Value>> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(HuginnError::Cancelled);
        }

        let resolved = match resolve(request) {
            Resolution::Remote(resolved) => resolved,
            Resolution::Empty => {
                debug!(operation = request.operation(), "blank query, skipping network");
                return Ok(Arc::new(empty_listing()));
            }
        };
        let operation = resolved.operation;
        let key = resolved.key();

        if let Some(payload) = self.cache.get(&key).await {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => operation).increment(1);
            debug!(%key, "cache hit");
            return Ok(payload);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => operation).increment(1);

        let pending = self
            .inflight
            .dedupe(&key, || self.network_call(key.clone(), resolved));
        if pending.joined {
            metrics::counter!(telemetry::COALESCED_TOTAL, "operation" => operation).increment(1);
            debug!(%key, "joined in-flight request");
        }

        match cancel {
            None => pending.handle.await,
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(%key, "caller cancelled");
                        Err(HuginnError::Cancelled)
                    }
                    result = pending.handle => result,
                }
            }
        }
    }

    /// Build the single network call serving `key`.
    fn network_call(&self, key: RequestKey, request: ResolvedRequest) -> Fetch {
        let transport = Arc::clone(&self.transport);
        let gate = Arc::clone(&self.gate);
        let cache = self.cache.clone();
        let retry = self.retry.clone();
        let epoch = Arc::clone(&self.epoch);
        let started_in = epoch.load(Ordering::SeqCst);

        async move {
            let operation = request.operation;
            let started = Instant::now();
            info!(%key, transport = transport.name(), "fetching from remote");

            let result = with_retry(&retry, operation, || async {
                gate.acquire().await;
                let payload = transport.get(&request).await?;
                request.shape.validate(&payload)?;
                Ok::<_, AttemptError>(payload)
            })
            .await;

            metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "operation" => operation)
                .record(started.elapsed().as_secs_f64());
            let status = if result.is_ok() { "ok" } else { "error" };
            metrics::counter!(telemetry::REQUESTS_TOTAL, "operation" => operation, "status" => status)
                .increment(1);

            match result {
                Ok(payload) => {
                    let payload = Arc::new(payload);
                    if epoch.load(Ordering::SeqCst) == started_in {
                        cache.put(key, Arc::clone(&payload)).await;
                    } else {
                        debug!(%key, "cache cleared during call, not caching");
                    }
                    Ok(payload)
                }
                Err(e) => {
                    warn!(%key, error = %e, "request failed");
                    Err(e)
                }
            }
        }
        .boxed()
    }
}
