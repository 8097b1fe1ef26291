//! huginn: command-line reader for the listing API
//!
//! Thin front end over [`huginn::RequestClient`]; every subcommand is one
//! client call whose payload is printed as text or raw JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use huginn::config::Config;
use huginn::types::{
    DEFAULT_PAGE_SIZE, DEFAULT_POPULAR_COMMUNITIES, DEFAULT_SUGGESTION_LIMIT, thread_parts,
};
use huginn::{
    CommunityListingRequest, CommunitySummary, Huginn, Listing, ListingRequest, Post,
    SearchRequest, Sort, ThreadRequest,
};
use serde_json::Value;

/// Huginn CLI
#[derive(Parser)]
#[command(name = "huginn")]
#[command(version = huginn::PKG_VERSION)]
#[command(about = "Rate-limited, caching reader for Reddit-style listings")]
struct Args {
    /// Config file (default: ~/.huginn/config.toml, then /etc/huginn/config.toml)
    #[arg(short, long, env = "HUGINN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, env = "HUGINN_BASE_URL")]
    base_url: Option<String>,

    /// Print raw JSON payloads instead of summaries
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Browse a section (home, popular, all)
    Listing {
        #[arg(default_value = "home")]
        section: String,
        /// Sort order (best, hot, new, top, rising)
        #[arg(short, long)]
        sort: Option<Sort>,
        /// Page size (clamped to 1..=50)
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        /// Cursor of the page to fetch
        #[arg(long)]
        after: Option<String>,
    },

    /// Search posts
    Search {
        query: String,
        /// Sort order (relevance, hot, top, new, comments)
        #[arg(short, long)]
        sort: Option<Sort>,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long)]
        after: Option<String>,
    },

    /// Suggest communities matching a prefix
    Communities {
        query: String,
        #[arg(short, long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: u32,
    },

    /// Show a community's about page
    About { community: String },

    /// Browse one community
    Community {
        community: String,
        #[arg(short, long)]
        sort: Option<Sort>,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long)]
        after: Option<String>,
    },

    /// Show a post and its top-level comments
    Thread {
        community: String,
        id: String,
        /// Comment sort (confidence, top, new, controversial, old, qa)
        #[arg(short, long)]
        sort: Option<Sort>,
    },

    /// List currently popular communities
    Popular {
        #[arg(short, long, default_value_t = DEFAULT_POPULAR_COMMUNITIES)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let mut builder = config.apply(Huginn::builder());
    if let Some(url) = args.base_url {
        builder = builder.base_url(url);
    }
    let client = builder.build()?;

    let payload = match args.command {
        Command::Listing {
            section,
            sort,
            limit,
            after,
        } => {
            let mut request = ListingRequest::new(section.as_str()).limit(limit);
            request.sort = sort;
            request.after = after;
            client.fetch_listing(&request).await?
        }
        Command::Search {
            query,
            sort,
            limit,
            after,
        } => {
            let mut request = SearchRequest::new(query).limit(limit);
            request.sort = sort;
            request.after = after;
            client.fetch_search_results(&request).await?
        }
        Command::Communities { query, limit } => {
            client.fetch_community_suggestions(&query, limit).await?
        }
        Command::About { community } => client.fetch_community_info(&community).await?,
        Command::Community {
            community,
            sort,
            limit,
            after,
        } => {
            let mut request = CommunityListingRequest::new(community).limit(limit);
            request.sort = sort;
            request.after = after;
            client.fetch_community_listing(&request).await?
        }
        Command::Thread {
            community,
            id,
            sort,
        } => {
            let mut request = ThreadRequest::new(community, id);
            request.sort = sort;
            let payload = client.fetch_thread_detail(&request).await?;
            if !args.json {
                print_thread(&payload);
                return Ok(());
            }
            payload
        }
        Command::Popular { limit } => client.fetch_popular_communities(limit).await?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*payload)?);
    } else {
        print_summary(&payload);
    }

    Ok(())
}

fn print_summary(payload: &Arc<Value>) {
    // about.json is a single thing rather than a listing
    if payload.get("kind").and_then(Value::as_str) == Some(huginn::types::COMMUNITY_KIND) {
        if let Some(community) = payload.get("data").and_then(CommunitySummary::from_data) {
            print_community(&community);
        }
        return;
    }

    let Some(listing) = Listing::from_envelope(payload) else {
        println!("(unrecognised payload)");
        return;
    };

    let posts = Post::collect(&listing);
    let communities = CommunitySummary::collect(&listing);
    if posts.is_empty() && communities.is_empty() {
        println!("(no results)");
    }
    for post in &posts {
        print_post(post);
    }
    for community in &communities {
        print_community(community);
    }
    if let Some(after) = &listing.after {
        println!();
        println!("next page: --after {after}");
    }
}

fn print_thread(payload: &Value) {
    let Some((post, comments)) = thread_parts(payload) else {
        println!("(unrecognised payload)");
        return;
    };
    for post in Post::collect(&post) {
        print_post(&post);
    }
    println!();
    for comment in comments.children.iter().filter(|c| c.kind == "t1") {
        let author = comment
            .data
            .get("author")
            .and_then(Value::as_str)
            .unwrap_or("[deleted]");
        let body = comment
            .data
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let first_line = body.lines().next().unwrap_or_default();
        println!("  {author}: {first_line}");
    }
}

fn print_post(post: &Post) {
    println!(
        "{:>6}  r/{:<20} {}  ({} comments, u/{})",
        post.score, post.community, post.title, post.num_comments, post.author
    );
}

fn print_community(community: &CommunitySummary) {
    match community.subscribers {
        Some(n) => println!("r/{:<24} {n:>10} subscribers", community.name),
        None => println!("r/{}", community.name),
    }
    if let Some(description) = &community.description {
        println!("    {}", description.lines().next().unwrap_or_default());
    }
}
