// src/config/feed.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Duration as ChronoDuration;

pub const LESSWRONG_GRAPHQL_URL: &str = "https://www.lesswrong.com/graphql";

pub const ALL_POSTS_FILE: &str = "lesswrong_posts.json";
pub const HIGH_KARMA_FILE: &str = "lesswrong_high_karma_posts.json";
pub const RECENT_FILE: &str = "lesswrong_recent_posts.json";

/// Fetch + filter knobs. The defaults are the values the site build runs with;
/// nothing reads them from files or env. Tests shrink them via the `with_*` builders.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub endpoint: String,
    pub page_size: u32,
    /// Aggregation stops once at least this many posts are collected.
    pub max_posts: usize,
    pub score_threshold: i64,
    pub recent_window: ChronoDuration,
    /// Pause between two successful page requests.
    pub request_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: LESSWRONG_GRAPHQL_URL.to_string(),
            page_size: 100,
            max_posts: 1000,
            score_threshold: 100,
            recent_window: ChronoDuration::days(7),
            request_delay: Duration::from_millis(500),
        }
    }
}

impl FeedConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_posts(mut self, max_posts: usize) -> Self {
        self.max_posts = max_posts;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

/// The two destinations every collection is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    /// Read by the site generator at build time (`_data/`).
    pub data: PathBuf,
    /// Copied verbatim into the rendered site (`assets/`).
    pub assets: PathBuf,
}

impl OutputDirs {
    pub fn new(data: impl Into<PathBuf>, assets: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            assets: assets.into(),
        }
    }

    /// Standard layout under a site source root: `<root>/_data` and `<root>/assets`.
    pub fn for_site(root: &Path) -> Self {
        Self::new(root.join("_data"), root.join("assets"))
    }
}
