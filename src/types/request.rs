//! Request descriptors handed to the client by callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Default number of typeahead community suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: u32 = 5;

/// Default number of popular communities fetched.
pub const DEFAULT_POPULAR_COMMUNITIES: u32 = 10;

/// Top-level content section.
///
/// Unrecognised names parse to [`Section::Unknown`] rather than failing;
/// the resolver maps it onto a default path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Section {
    Home,
    Popular,
    All,
    Unknown(String),
}

impl Section {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "home" => Section::Home,
            "popular" => Section::Popular,
            "all" => Section::All,
            _ => Section::Unknown(name.to_string()),
        }
    }

    /// Canonical default sort for this section.
    pub fn default_sort(&self) -> Sort {
        match self {
            Section::Home => Sort::Best,
            _ => Sort::Hot,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Section::Home => "home",
            Section::Popular => "popular",
            Section::All => "all",
            Section::Unknown(name) => name,
        }
    }
}

impl From<&str> for Section {
    fn from(name: &str) -> Self {
        Section::parse(name)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort modes understood by the remote API.
///
/// Not every mode is valid everywhere; see [`Sort::LISTING`], [`Sort::SEARCH`]
/// and [`Sort::COMMENTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Best,
    Hot,
    New,
    Top,
    Rising,
    Controversial,
    Relevance,
    Comments,
    Confidence,
    Old,
    Qa,
}

impl Sort {
    /// Sorts accepted by section and community listings.
    pub const LISTING: &'static [Sort] = &[
        Sort::Best,
        Sort::Hot,
        Sort::New,
        Sort::Top,
        Sort::Rising,
        Sort::Controversial,
    ];

    /// Sorts accepted by post search.
    pub const SEARCH: &'static [Sort] = &[
        Sort::Relevance,
        Sort::Hot,
        Sort::Top,
        Sort::New,
        Sort::Comments,
    ];

    /// Sorts accepted by a thread's comment tree.
    pub const COMMENTS: &'static [Sort] = &[
        Sort::Confidence,
        Sort::Top,
        Sort::New,
        Sort::Controversial,
        Sort::Old,
        Sort::Qa,
    ];

    /// Parse a sort name, returning `None` for anything outside the table.
    pub fn parse(name: &str) -> Option<Self> {
        let sort = match name.trim().to_ascii_lowercase().as_str() {
            "best" => Sort::Best,
            "hot" => Sort::Hot,
            "new" => Sort::New,
            "top" => Sort::Top,
            "rising" => Sort::Rising,
            "controversial" => Sort::Controversial,
            "relevance" => Sort::Relevance,
            "comments" => Sort::Comments,
            "confidence" => Sort::Confidence,
            "old" => Sort::Old,
            "qa" => Sort::Qa,
            _ => return None,
        };
        Some(sort)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Best => "best",
            Sort::Hot => "hot",
            Sort::New => "new",
            Sort::Top => "top",
            Sort::Rising => "rising",
            Sort::Controversial => "controversial",
            Sort::Relevance => "relevance",
            Sort::Comments => "comments",
            Sort::Confidence => "confidence",
            Sort::Old => "old",
            Sort::Qa => "qa",
        }
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sort::parse(s).ok_or_else(|| format!("unknown sort: {s}"))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paginated section listing (home, popular, all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub section: Section,
    pub sort: Option<Sort>,
    pub after: Option<String>,
    pub limit: u32,
}

impl ListingRequest {
    pub fn new(section: impl Into<Section>) -> Self {
        Self {
            section: section.into(),
            sort: None,
            after: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Keyword search over posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub sort: Option<Sort>,
    pub after: Option<String>,
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sort: None,
            after: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Paginated listing of a single community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityListingRequest {
    pub community: String,
    pub sort: Option<Sort>,
    pub after: Option<String>,
    pub limit: u32,
}

impl CommunityListingRequest {
    pub fn new(community: impl Into<String>) -> Self {
        Self {
            community: community.into(),
            sort: None,
            after: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// A post together with its comment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRequest {
    pub community: String,
    pub thread_id: String,
    pub sort: Option<Sort>,
}

impl ThreadRequest {
    pub fn new(community: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            community: community.into(),
            thread_id: thread_id.into(),
            sort: None,
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Any logical request the client can serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Listing(ListingRequest),
    Search(SearchRequest),
    CommunitySuggestions { query: String, limit: u32 },
    CommunityInfo { community: String },
    CommunityListing(CommunityListingRequest),
    Thread(ThreadRequest),
    PopularCommunities { limit: u32 },
}

impl Request {
    /// Operation label used in logs and metrics.
    pub fn operation(&self) -> &'static str {
        match self {
            Request::Listing(_) => "listing",
            Request::Search(_) => "search",
            Request::CommunitySuggestions { .. } => "community_suggestions",
            Request::CommunityInfo { .. } => "community_info",
            Request::CommunityListing(_) => "community_listing",
            Request::Thread(_) => "thread",
            Request::PopularCommunities { .. } => "popular_communities",
        }
    }

    /// Whether this request pages through results with an `after` cursor.
    pub fn is_paginated(&self) -> bool {
        matches!(
            self,
            Request::Listing(_) | Request::Search(_) | Request::CommunityListing(_)
        )
    }

    /// Copy of this request positioned at `cursor`.
    ///
    /// Non-paginated requests are returned unchanged.
    pub fn with_cursor(&self, cursor: Option<String>) -> Request {
        let mut next = self.clone();
        match &mut next {
            Request::Listing(r) => r.after = cursor,
            Request::Search(r) => r.after = cursor,
            Request::CommunityListing(r) => r.after = cursor,
            _ => {}
        }
        next
    }
}

impl From<ListingRequest> for Request {
    fn from(r: ListingRequest) -> Self {
        Request::Listing(r)
    }
}

impl From<SearchRequest> for Request {
    fn from(r: SearchRequest) -> Self {
        Request::Search(r)
    }
}

impl From<CommunityListingRequest> for Request {
    fn from(r: CommunityListingRequest) -> Self {
        Request::CommunityListing(r)
    }
}

impl From<ThreadRequest> for Request {
    fn from(r: ThreadRequest) -> Self {
        Request::Thread(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_parse_is_case_insensitive() {
        assert_eq!(Section::parse("Home"), Section::Home);
        assert_eq!(Section::parse(" all "), Section::All);
        assert_eq!(
            Section::parse("frontpage"),
            Section::Unknown("frontpage".into())
        );
    }

    #[test]
    fn section_default_sorts() {
        assert_eq!(Section::Home.default_sort(), Sort::Best);
        assert_eq!(Section::Popular.default_sort(), Sort::Hot);
        assert_eq!(Section::Unknown("x".into()).default_sort(), Sort::Hot);
    }

    #[test]
    fn sort_parse_rejects_unknown_names() {
        assert_eq!(Sort::parse("TOP"), Some(Sort::Top));
        assert_eq!(Sort::parse("sideways"), None);
        assert!("sideways".parse::<Sort>().is_err());
    }

    #[test]
    fn with_cursor_only_touches_paginated_requests() {
        let listing: Request = ListingRequest::new("home").into();
        match listing.with_cursor(Some("t3_abc".into())) {
            Request::Listing(r) => assert_eq!(r.after.as_deref(), Some("t3_abc")),
            other => panic!("unexpected {other:?}"),
        }

        let info = Request::CommunityInfo {
            community: "rust".into(),
        };
        assert_eq!(info.with_cursor(Some("t3_abc".into())), info);
        assert!(!info.is_paginated());
    }
}
