//! Tests for endpoint resolution and request keys.

use huginn::endpoint::{Resolution, ResolvedRequest, resolve};
use huginn::{
    CommunityListingRequest, ListingRequest, Request, RequestKey, SearchRequest, Shape, Sort,
    ThreadRequest,
};

fn remote(request: impl Into<Request>) -> ResolvedRequest {
    match resolve(&request.into()) {
        Resolution::Remote(r) => r,
        Resolution::Empty => panic!("expected a remote request"),
    }
}

fn query(r: &ResolvedRequest, name: &str) -> Option<String> {
    r.query.get(name).cloned()
}

// =========================================================================
// Section listings
// =========================================================================

#[test]
fn home_default_is_best() {
    let r = remote(ListingRequest::new("home"));
    assert_eq!(r.path, "/best.json");
    assert_eq!(query(&r, "limit").as_deref(), Some("25"));
    assert_eq!(query(&r, "raw_json").as_deref(), Some("1"));
    assert_eq!(r.shape, Shape::Listing);
}

#[test]
fn home_with_sort() {
    assert_eq!(remote(ListingRequest::new("home").sort(Sort::New)).path, "/new.json");
    assert_eq!(remote(ListingRequest::new("home").sort(Sort::Top)).path, "/top.json");
}

#[test]
fn popular_and_all_default_to_hot() {
    assert_eq!(remote(ListingRequest::new("popular")).path, "/r/popular/hot.json");
    assert_eq!(remote(ListingRequest::new("all")).path, "/r/all/hot.json");
    assert_eq!(
        remote(ListingRequest::new("all").sort(Sort::Rising)).path,
        "/r/all/rising.json"
    );
}

#[test]
fn popular_best_falls_back_to_hot() {
    assert_eq!(
        remote(ListingRequest::new("popular").sort(Sort::Best)).path,
        "/r/popular/hot.json"
    );
}

#[test]
fn unknown_section_uses_fallback_path() {
    let r = remote(ListingRequest::new("frontpage").sort(Sort::Top));
    assert_eq!(r.path, "/r/popular.json");
    assert_eq!(query(&r, "limit").as_deref(), Some("25"));
}

#[test]
fn sort_outside_listing_table_uses_default() {
    // relevance is a search-only sort
    assert_eq!(
        remote(ListingRequest::new("home").sort(Sort::Relevance)).path,
        "/best.json"
    );
    assert_eq!(
        remote(ListingRequest::new("popular").sort(Sort::Confidence)).path,
        "/r/popular/hot.json"
    );
}

// =========================================================================
// Paging
// =========================================================================

#[test]
fn page_size_is_clamped() {
    let r = remote(ListingRequest::new("home").limit(500));
    assert_eq!(query(&r, "limit").as_deref(), Some("50"));

    let r = remote(ListingRequest::new("home").limit(0));
    assert_eq!(query(&r, "limit").as_deref(), Some("1"));
}

#[test]
fn cursor_adds_after_and_count() {
    let r = remote(ListingRequest::new("popular").after("t3_abc").limit(10));
    assert_eq!(query(&r, "after").as_deref(), Some("t3_abc"));
    assert_eq!(query(&r, "count").as_deref(), Some("10"));
}

#[test]
fn first_page_has_no_cursor() {
    let r = remote(ListingRequest::new("popular"));
    assert!(query(&r, "after").is_none());
    assert!(query(&r, "count").is_none());
}

#[test]
fn pages_have_distinct_keys() {
    let first = remote(ListingRequest::new("home")).key();
    let second = remote(ListingRequest::new("home").after("t3_x")).key();
    assert_ne!(first, second);
}

// =========================================================================
// Search
// =========================================================================

#[test]
fn search_query_parameters() {
    let r = remote(SearchRequest::new("rust lang").sort(Sort::New).limit(5));
    assert_eq!(r.path, "/search.json");
    assert_eq!(query(&r, "q").as_deref(), Some("rust lang"));
    assert_eq!(query(&r, "sort").as_deref(), Some("new"));
    assert_eq!(query(&r, "type").as_deref(), Some("link"));
    assert_eq!(query(&r, "limit").as_deref(), Some("5"));
}

#[test]
fn search_defaults_to_relevance() {
    let r = remote(SearchRequest::new("rust"));
    assert_eq!(query(&r, "sort").as_deref(), Some("relevance"));

    // rising is a listing-only sort
    let r = remote(SearchRequest::new("rust").sort(Sort::Rising));
    assert_eq!(query(&r, "sort").as_deref(), Some("relevance"));
}

#[test]
fn blank_search_resolves_empty() {
    assert_eq!(resolve(&SearchRequest::new("").into()), Resolution::Empty);
    assert_eq!(resolve(&SearchRequest::new("   ").into()), Resolution::Empty);
}

#[test]
fn search_query_is_trimmed() {
    let a = remote(SearchRequest::new("  rust ")).key();
    let b = remote(SearchRequest::new("rust")).key();
    assert_eq!(a, b);
}

// =========================================================================
// Communities and threads
// =========================================================================

#[test]
fn community_suggestions() {
    let r = remote(Request::CommunitySuggestions {
        query: "rus".into(),
        limit: 5,
    });
    assert_eq!(r.path, "/api/subreddit_autocomplete_v2.json");
    assert_eq!(query(&r, "query").as_deref(), Some("rus"));
    assert_eq!(query(&r, "limit").as_deref(), Some("5"));
    assert_eq!(query(&r, "include_over_18").as_deref(), Some("false"));
}

#[test]
fn blank_suggestions_resolve_empty() {
    let request = Request::CommunitySuggestions {
        query: " ".into(),
        limit: 5,
    };
    assert_eq!(resolve(&request), Resolution::Empty);
}

#[test]
fn community_info_strips_prefix() {
    let r = remote(Request::CommunityInfo {
        community: "r/rust".into(),
    });
    assert_eq!(r.path, "/r/rust/about.json");
    assert_eq!(r.shape, Shape::Thing);
}

#[test]
fn community_listing_paths() {
    assert_eq!(
        remote(CommunityListingRequest::new("rust")).path,
        "/r/rust/hot.json"
    );
    assert_eq!(
        remote(CommunityListingRequest::new("rust").sort(Sort::Best)).path,
        "/r/rust.json"
    );
    assert_eq!(
        remote(CommunityListingRequest::new("rust").sort(Sort::Top)).path,
        "/r/rust/top.json"
    );
}

#[test]
fn thread_detail() {
    let r = remote(ThreadRequest::new("rust", "abc123"));
    assert_eq!(r.path, "/r/rust/comments/abc123.json");
    assert_eq!(query(&r, "sort").as_deref(), Some("confidence"));
    assert_eq!(r.shape, Shape::Thread);

    let r = remote(ThreadRequest::new("rust", "abc123").sort(Sort::Old));
    assert_eq!(query(&r, "sort").as_deref(), Some("old"));
}

#[test]
fn popular_communities() {
    let r = remote(Request::PopularCommunities { limit: 10 });
    assert_eq!(r.path, "/subreddits/popular.json");
    assert_eq!(query(&r, "limit").as_deref(), Some("10"));
}

// =========================================================================
// Request keys
// =========================================================================

#[test]
fn identical_requests_share_a_key() {
    let a = remote(ListingRequest::new("all").sort(Sort::Top).limit(10)).key();
    let b = remote(ListingRequest::new("all").limit(10).sort(Sort::Top)).key();
    assert_eq!(a, b);
}

#[test]
fn key_is_path_and_sorted_query() {
    let key = remote(SearchRequest::new("rust").limit(5)).key();
    assert_eq!(
        key.as_str(),
        "/search.json?limit=5&q=rust&raw_json=1&sort=relevance&type=link"
    );
    assert_eq!(
        key,
        RequestKey::new(
            "/search.json",
            [
                ("type", "link"),
                ("sort", "relevance"),
                ("q", "rust"),
                ("raw_json", "1"),
                ("limit", "5"),
            ]
        )
    );
}
