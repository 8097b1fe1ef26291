//! Huginn - rate-limited, caching client for Reddit-style listing APIs
//!
//! This crate sits between a UI and a read-only remote JSON API with strict
//! rate limits. Every request goes through one [`RequestClient`], which:
//!
//! - serves fresh responses from a TTL cache,
//! - coalesces concurrent identical requests onto one network call,
//! - spaces outgoing calls with a process-wide rate gate,
//! - retries 429s and transport failures with bounded, fixed delays.
//!
//! # Example
//!
//! ```rust,no_run
//! use huginn::{Huginn, ListingRequest, Listing, Post, Sort};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let client = Huginn::builder().build()?;
//!
//!     let envelope = client
//!         .fetch_listing(&ListingRequest::new("popular").sort(Sort::Top).limit(10))
//!         .await?;
//!
//!     if let Some(listing) = Listing::from_envelope(&envelope) {
//!         for post in Post::collect(&listing) {
//!             println!("{} ({})", post.title, post.community);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Paging
//!
//! ```rust,no_run
//! use huginn::{Huginn, ListingFeed, ListingRequest};
//!
//! # async fn run() -> huginn::Result<()> {
//! let client = Huginn::builder().build()?;
//! let mut feed = ListingFeed::new(ListingRequest::new("home"));
//! feed.reset(&client).await?;
//! while feed.has_more() {
//!     feed.load_more(&client).await?;
//! }
//! println!("{} posts", feed.posts().len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
#[cfg(feature = "cli")]
pub mod config;
pub mod endpoint;
pub mod error;
pub mod feed;
pub mod gate;
pub mod telemetry;
pub mod transport;
pub mod types;
mod version;

// Re-export main types at crate root
pub use cache::CacheConfig;
pub use client::{ClientBuilder, Huginn, RequestClient};
pub use endpoint::{MAX_PAGE_SIZE, RequestKey};
pub use error::{AttemptError, FailureClass, HuginnError, Result};
pub use feed::{ListingFeed, Supersede};
pub use gate::GateConfig;
pub use transport::{HttpTransport, RetryConfig, Transport};
pub use version::{PKG_VERSION, user_agent};

pub use tokio_util::sync::CancellationToken;

// Re-export all types
pub use types::{
    CommunityListingRequest, CommunitySummary, Listing, ListingRequest, Post, Request,
    SearchRequest, Section, Shape, Sort, Thing, ThreadRequest,
};
