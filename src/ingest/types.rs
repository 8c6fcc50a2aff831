// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One LessWrong post as returned by the `posts.results` selection.
/// Field names on the wire (and in the persisted JSON) follow the API verbatim,
/// and values are written back exactly as received (nulls stay null).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// The API types scores as Float; `212` and `212.0` both arrive and are kept as sent.
    #[serde(rename = "baseScore", default)]
    pub base_score: Option<Number>,
    #[serde(default)]
    pub url: Option<String>,
    /// ISO-8601 string, kept as received; parsed only when deriving views.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Post {
    /// `true` when a score is present and `>= threshold`.
    pub fn score_at_least(&self, threshold: i64) -> bool {
        match &self.base_score {
            None => false,
            Some(n) => match n.as_i64() {
                Some(i) => i >= threshold,
                None => n.as_f64().is_some_and(|f| f >= threshold as f64),
            },
        }
    }
}

/// Anything that can hand out one page of posts for a `(limit, offset)` window.
///
/// Contract used by [`crate::ingest::fetch_all`]:
/// * `Ok(vec![])` means "no more posts" (including soft HTTP failures).
/// * `Err(_)` is unrecoverable for the current run; aggregation stops there.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, limit: u32, offset: u32) -> Result<Vec<Post>>;
    fn name(&self) -> &'static str;
}
