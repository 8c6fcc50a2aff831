use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::config::feed::{FeedConfig, LESSWRONG_GRAPHQL_URL};
use crate::ingest::types::{PageSource, Post};

const POSTS_QUERY: &str = r#"
query getPosts($limit: Int, $offset: Int) {
  posts(
    input: {
      terms: {
        limit: $limit
        offset: $offset
        meta: null
        filter: "frontpage"
      }
    }
  ) {
    results {
      _id
      title
      slug
      baseScore
      url
      createdAt
    }
  }
}
"#;

// Every level is optional: a missing `data.posts.results` path is an empty page.
#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<PostsData>,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    #[serde(default)]
    posts: Option<PostsConnection>,
}

#[derive(Debug, Deserialize)]
struct PostsConnection {
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
}

/// Parse a GraphQL response body into a page of posts.
///
/// Malformed JSON is an error; an absent results path is an empty page.
/// Individual results that are not post-shaped (e.g. no `_id`) are skipped with a warning.
pub fn parse_page(body: &str) -> Result<Vec<Post>> {
    let resp: GraphqlResponse =
        serde_json::from_str(body).context("parsing lesswrong graphql response")?;
    let raw = resp
        .data
        .and_then(|d| d.posts)
        .and_then(|p| p.results)
        .unwrap_or_default();

    let mut out = Vec::with_capacity(raw.len());
    for (idx, item) in raw.into_iter().enumerate() {
        match serde_json::from_value::<Post>(item) {
            Ok(post) => out.push(post),
            Err(e) => {
                tracing::warn!(error = %e, index = idx, "skipping malformed lesswrong result");
                counter!("feed_records_skipped_total").increment(1);
            }
        }
    }
    Ok(out)
}

/// Request body for one page.
pub fn page_request(limit: u32, offset: u32) -> serde_json::Value {
    serde_json::json!({
        "query": POSTS_QUERY,
        "variables": {
            "limit": limit,
            "offset": offset,
        }
    })
}

/// GraphQL client for the LessWrong `posts` query.
pub struct LessWrongClient {
    http: reqwest::Client,
    endpoint: String,
}

impl LessWrongClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(LESSWRONG_GRAPHQL_URL)
    }

    pub fn from_config(cfg: &FeedConfig) -> Result<Self> {
        Self::with_endpoint(cfg.endpoint.clone())
    }

    /// Point the client at another endpoint (local test servers).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lesswrong-feed/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PageSource for LessWrongClient {
    async fn fetch_page(&self, limit: u32, offset: u32) -> Result<Vec<Post>> {
        let t0 = std::time::Instant::now();

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&page_request(limit, offset))
            .send()
            .await
            .with_context(|| format!("lesswrong graphql post (offset {offset})"))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            tracing::warn!(
                status = status.as_u16(),
                body = %snippet,
                offset,
                "lesswrong error response"
            );
            counter!("feed_fetch_http_errors_total").increment(1);
            return Ok(Vec::new());
        }

        let body = resp.text().await.context("lesswrong http .text()")?;
        let posts = parse_page(&body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_fetch_ms").record(ms);
        counter!("feed_posts_fetched_total").increment(posts.len() as u64);
        tracing::debug!(offset, count = posts.len(), ms, "lesswrong page fetched");
        Ok(posts)
    }

    fn name(&self) -> &'static str {
        "LessWrong"
    }
}
