//! Endpoint resolution: logical request → concrete path and query.
//!
//! Resolution is pure and infallible. Anything the remote would reject is
//! mapped onto a degraded but valid request instead:
//!
//! - unknown sections resolve to the popular listing,
//! - sorts outside a request's table become that request's default sort,
//! - page sizes are clamped to `1..=MAX_PAGE_SIZE`.
//!
//! Blank search queries never reach the network; they resolve to
//! [`Resolution::Empty`].

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

use crate::types::{
    CommunityListingRequest, ListingRequest, Request, SearchRequest, Section, Shape, Sort,
    ThreadRequest,
};

/// Largest page size the remote API honours.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Path used when a section name is not recognised.
pub const FALLBACK_LISTING_PATH: &str = "/r/popular.json";

/// Canonical identity of a request, used for caching and coalescing.
///
/// Built from the path and the query pairs sorted by name, so parameter
/// insertion order never matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new<I, K, V>(path: &str, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let sorted: BTreeMap<String, String> = query
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_sorted(path, &sorted)
    }

    fn from_sorted(path: &str, query: &BTreeMap<String, String>) -> Self {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter())
            .finish();
        Self(format!("{path}?{encoded}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request ready to be sent: path, query and the shape to validate against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub operation: &'static str,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub shape: Shape,
}

impl ResolvedRequest {
    fn new(operation: &'static str, path: String, shape: Shape) -> Self {
        let mut query = BTreeMap::new();
        query.insert("raw_json".to_string(), "1".to_string());
        Self {
            operation,
            path,
            query,
            shape,
        }
    }

    fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    fn page(mut self, after: Option<&str>, requested: u32) -> Self {
        self = self.param("limit", clamp_page_size(requested));
        if let Some(cursor) = after {
            self = self.param("after", cursor).param("count", requested);
        }
        self
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::from_sorted(&self.path, &self.query)
    }
}

/// Outcome of resolving a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Must be fetched from the remote.
    Remote(ResolvedRequest),
    /// Answered locally with an empty listing.
    Empty,
}

/// Resolve a logical request.
pub fn resolve(request: &Request) -> Resolution {
    let operation = request.operation();
    let resolved = match request {
        Request::Listing(r) => listing(operation, r),
        Request::Search(r) => match search(operation, r) {
            Some(resolved) => resolved,
            None => return Resolution::Empty,
        },
        Request::CommunitySuggestions { query, limit } => {
            let query = query.trim();
            if query.is_empty() {
                return Resolution::Empty;
            }
            ResolvedRequest::new(
                operation,
                "/api/subreddit_autocomplete_v2.json".to_string(),
                Shape::Listing,
            )
            .param("query", query)
            .param("limit", clamp_page_size(*limit))
            .param("include_over_18", "false")
        }
        Request::CommunityInfo { community } => ResolvedRequest::new(
            operation,
            format!("/r/{}/about.json", segment(community)),
            Shape::Thing,
        ),
        Request::CommunityListing(r) => community_listing(operation, r),
        Request::Thread(r) => thread(operation, r),
        Request::PopularCommunities { limit } => ResolvedRequest::new(
            operation,
            "/subreddits/popular.json".to_string(),
            Shape::Listing,
        )
        .param("limit", clamp_page_size(*limit)),
    };
    Resolution::Remote(resolved)
}

fn listing(operation: &'static str, r: &ListingRequest) -> ResolvedRequest {
    let sort = pick_sort(r.sort, Sort::LISTING, r.section.default_sort());
    let path = match &r.section {
        Section::Home if sort == Sort::Best => "/best.json".to_string(),
        Section::Home => format!("/{sort}.json"),
        // /r/popular/best is not a thing; fall back to the section default.
        Section::Popular | Section::All => {
            let sort = if sort == Sort::Best { Sort::Hot } else { sort };
            format!("/r/{}/{sort}.json", r.section)
        }
        Section::Unknown(_) => FALLBACK_LISTING_PATH.to_string(),
    };
    ResolvedRequest::new(operation, path, Shape::Listing).page(r.after.as_deref(), r.limit)
}

fn search(operation: &'static str, r: &SearchRequest) -> Option<ResolvedRequest> {
    let query = r.query.trim();
    if query.is_empty() {
        return None;
    }
    let sort = pick_sort(r.sort, Sort::SEARCH, Sort::Relevance);
    Some(
        ResolvedRequest::new(operation, "/search.json".to_string(), Shape::Listing)
            .param("q", query)
            .param("sort", sort)
            .param("type", "link")
            .page(r.after.as_deref(), r.limit),
    )
}

fn community_listing(operation: &'static str, r: &CommunityListingRequest) -> ResolvedRequest {
    let sort = pick_sort(r.sort, Sort::LISTING, Sort::Hot);
    let name = segment(&r.community);
    let path = if sort == Sort::Best {
        format!("/r/{name}.json")
    } else {
        format!("/r/{name}/{sort}.json")
    };
    ResolvedRequest::new(operation, path, Shape::Listing).page(r.after.as_deref(), r.limit)
}

fn thread(operation: &'static str, r: &ThreadRequest) -> ResolvedRequest {
    let sort = pick_sort(r.sort, Sort::COMMENTS, Sort::Confidence);
    ResolvedRequest::new(
        operation,
        format!(
            "/r/{}/comments/{}.json",
            segment(&r.community),
            segment(&r.thread_id)
        ),
        Shape::Thread,
    )
    .param("sort", sort)
}

fn pick_sort(requested: Option<Sort>, allowed: &[Sort], default: Sort) -> Sort {
    requested
        .filter(|sort| allowed.contains(sort))
        .unwrap_or(default)
}

fn clamp_page_size(requested: u32) -> u32 {
    requested.clamp(1, MAX_PAGE_SIZE)
}

/// Normalise a user-supplied path segment.
///
/// Strips an `r/` prefix and surrounding slashes, then percent-encodes the
/// rest so it cannot escape its segment.
fn segment(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    let name = trimmed
        .strip_prefix("r/")
        .or_else(|| trimmed.strip_prefix("/r/"))
        .unwrap_or(trimmed);
    form_urlencoded::byte_serialize(name.as_bytes()).collect()
}
