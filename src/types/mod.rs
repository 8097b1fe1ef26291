//! Public types for the Huginn API.

mod listing;
mod post;
mod request;

pub use listing::{Listing, Shape, Thing, empty_listing, thread_parts};
pub use post::{COMMUNITY_KIND, CommunitySummary, POST_KIND, Post};
pub use request::{
    CommunityListingRequest, DEFAULT_PAGE_SIZE, DEFAULT_POPULAR_COMMUNITIES,
    DEFAULT_SUGGESTION_LIMIT, ListingRequest, Request, SearchRequest, Section, Sort,
    ThreadRequest,
};
