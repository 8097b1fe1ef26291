//! Typed views over listing children.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::listing::Listing;

/// Listing `kind` tag of a post.
pub const POST_KIND: &str = "t3";

/// Listing `kind` tag of a community.
pub const COMMUNITY_KIND: &str = "t5";

/// Summary of a post, with placeholders for missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub community: String,
    pub created_utc: Option<f64>,
    pub num_comments: u64,
    pub score: i64,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
}

#[derive(Deserialize)]
struct RawPost {
    id: Option<String>,
    title: Option<String>,
    author: Option<String>,
    subreddit: Option<String>,
    created_utc: Option<f64>,
    num_comments: Option<u64>,
    score: Option<i64>,
    thumbnail: Option<String>,
    url: Option<String>,
    permalink: Option<String>,
}

impl Post {
    /// Build a post from a listing child's `data`.
    ///
    /// Returns `None` if the data has no `id`.
    pub fn from_data(data: &Value) -> Option<Self> {
        let raw: RawPost = serde_json::from_value(data.clone()).ok()?;
        Some(Self {
            id: raw.id?,
            title: non_empty(raw.title).unwrap_or_else(|| "Untitled Post".to_string()),
            author: non_empty(raw.author).unwrap_or_else(|| "[deleted]".to_string()),
            community: non_empty(raw.subreddit).unwrap_or_else(|| "unknown".to_string()),
            created_utc: raw.created_utc,
            num_comments: raw.num_comments.unwrap_or(0),
            score: raw.score.unwrap_or(0),
            thumbnail: raw.thumbnail,
            url: raw.url,
            permalink: raw.permalink,
        })
    }

    /// All `t3` children of a listing that parse as posts.
    pub fn collect(listing: &Listing) -> Vec<Post> {
        listing
            .children
            .iter()
            .filter(|child| child.kind == POST_KIND)
            .filter_map(|child| Post::from_data(&child.data))
            .collect()
    }
}

/// Summary of a community, as shown in search suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub subscribers: Option<u64>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct RawCommunity {
    id: Option<String>,
    display_name: Option<String>,
    icon_img: Option<String>,
    community_icon: Option<String>,
    subscribers: Option<u64>,
    public_description: Option<String>,
}

impl CommunitySummary {
    /// Build a summary from a `t5` thing's `data`.
    ///
    /// The icon falls back from `icon_img` to `community_icon`.
    pub fn from_data(data: &Value) -> Option<Self> {
        let raw: RawCommunity = serde_json::from_value(data.clone()).ok()?;
        Some(Self {
            id: raw.id?,
            name: raw.display_name?,
            icon: non_empty(raw.icon_img).or_else(|| non_empty(raw.community_icon)),
            subscribers: raw.subscribers,
            description: non_empty(raw.public_description),
        })
    }

    pub fn collect(listing: &Listing) -> Vec<CommunitySummary> {
        listing
            .children
            .iter()
            .filter(|child| child.kind == COMMUNITY_KIND)
            .filter_map(|child| CommunitySummary::from_data(&child.data))
            .collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
