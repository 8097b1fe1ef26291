//! Pagination state for one listing source.
//!
//! [`ListingFeed`] keeps the items loaded so far and the cursor for the next
//! page. A reset starts over and drops what was shown; a failed
//! `load_more` leaves already loaded items alone.
//!
//! [`Supersede`] implements "latest request wins": starting a new load
//! cancels whatever load was running before it.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::RequestClient;
use crate::types::{Listing, Post, Request, Thing};
use crate::{HuginnError, Result};

/// Hands out cancellation tokens, cancelling the previous one each time.
///
/// Cheap to clone; clones share the current token, so one task can cancel a
/// load another task started.
#[derive(Clone, Default)]
pub struct Supersede {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl Supersede {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the current load (if any) and return a token for a new one.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    /// Cancel the current load without starting another.
    pub fn cancel(&self) {
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = current {
            token.cancel();
        }
    }
}

/// Items and cursor of a paginated listing.
pub struct ListingFeed {
    request: Request,
    items: Vec<Thing>,
    after: Option<String>,
    loaded: bool,
    supersede: Supersede,
}

impl ListingFeed {
    pub fn new(request: impl Into<Request>) -> Self {
        Self {
            request: request.into(),
            items: Vec::new(),
            after: None,
            loaded: false,
            supersede: Supersede::new(),
        }
    }

    /// Switch to another source and forget loaded items; call
    /// [`reset`](Self::reset) to load the first page.
    ///
    /// This cannot interrupt a load in progress, which holds the feed
    /// mutably; cancel that one through a [`supersede`](Self::supersede)
    /// handle.
    pub fn set_request(&mut self, request: impl Into<Request>) {
        self.supersede.cancel();
        self.request = request.into();
        self.clear();
    }

    /// Load the first page, replacing everything loaded before.
    ///
    /// Returns the number of items loaded. On failure the feed stays empty.
    pub async fn reset(&mut self, client: &RequestClient) -> Result<usize> {
        self.clear();
        let listing = self.load_page(client, None).await?;
        let count = listing.children.len();
        self.after = listing.after;
        self.items = listing.children;
        self.loaded = true;
        Ok(count)
    }

    /// Append the next page.
    ///
    /// Returns the number of items appended, `0` if there is nothing more.
    /// On failure, already loaded items are kept and the cursor is unchanged,
    /// so the call can simply be repeated.
    pub async fn load_more(&mut self, client: &RequestClient) -> Result<usize> {
        if !self.loaded {
            return self.reset(client).await;
        }
        if !self.has_more() {
            return Ok(0);
        }
        let listing = self.load_page(client, self.after.clone()).await?;
        let count = listing.children.len();
        self.after = listing.after;
        self.items.extend(listing.children);
        Ok(count)
    }

    async fn load_page(&self, client: &RequestClient, after: Option<String>) -> Result<Listing> {
        let token = self.supersede.begin();
        let request = self.request.with_cursor(after);
        let payload: Arc<Value> = client.fetch_cancellable(&request, &token).await?;
        let listing = Listing::from_envelope(&payload)
            .ok_or_else(|| HuginnError::InvalidResponse("expected listing envelope".into()))?;
        debug!(
            operation = request.operation(),
            items = listing.children.len(),
            more = listing.after.is_some(),
            "feed page loaded"
        );
        Ok(listing)
    }

    fn clear(&mut self) {
        self.items.clear();
        self.after = None;
        self.loaded = false;
    }

    /// Whether another page can be requested.
    pub fn has_more(&self) -> bool {
        self.loaded && self.after.is_some() && self.request.is_paginated()
    }

    pub fn items(&self) -> &[Thing] {
        &self.items
    }

    /// Loaded items that are posts.
    pub fn posts(&self) -> Vec<Post> {
        self.items
            .iter()
            .filter(|thing| thing.kind == crate::types::POST_KIND)
            .filter_map(|thing| Post::from_data(&thing.data))
            .collect()
    }

    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Handle that cancels this feed's running load from elsewhere.
    pub fn supersede(&self) -> Supersede {
        self.supersede.clone()
    }
}
