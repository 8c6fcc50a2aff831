// src/ingest/mod.rs
pub mod providers;
pub mod types;

use std::fmt;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

use crate::config::FeedConfig;
use crate::ingest::types::{PageSource, Post};

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "feed_pages_fetched_total",
            "Non-empty pages appended to the collection."
        );
        describe_counter!(
            "feed_posts_fetched_total",
            "Posts parsed from successful responses."
        );
        describe_counter!(
            "feed_fetch_errors_total",
            "Fetch/parse errors that ended aggregation."
        );
        describe_counter!(
            "feed_fetch_http_errors_total",
            "Non-200 HTTP responses (treated as an empty page)."
        );
        describe_counter!(
            "feed_records_skipped_total",
            "Results dropped because they were not post-shaped."
        );
        describe_histogram!("feed_fetch_ms", "Page request + parse time in milliseconds.");
        describe_gauge!("feed_last_run_ts", "Unix ts when the generator last ran.");
    });
}

/// Why aggregation stopped.
#[derive(Debug)]
pub enum StopReason {
    /// The source returned an empty page.
    Exhausted,
    /// The collection reached the configured cap.
    CapReached,
    /// A page failed; everything before it is kept.
    Failed(anyhow::Error),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::Failed(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => f.write_str("exhausted"),
            StopReason::CapReached => f.write_str("cap reached"),
            StopReason::Failed(e) => write!(f, "failed: {e:#}"),
        }
    }
}

/// Result of a full aggregation run. Always carries whatever was collected,
/// even when `stop` is a failure.
#[derive(Debug)]
pub struct FetchOutcome {
    pub posts: Vec<Post>,
    pub pages_fetched: usize,
    pub stop: StopReason,
}

impl FetchOutcome {
    /// Human-readable diagnostic for a failed run, `None` otherwise.
    pub fn diagnostic(&self) -> Option<String> {
        match &self.stop {
            StopReason::Failed(e) => Some(format!(
                "error fetching posts: {e:#}; continuing with {} posts fetched so far",
                self.posts.len()
            )),
            _ => None,
        }
    }
}

/// Page through `source` until it runs dry, the cap is hit, or a page fails.
///
/// Requests are strictly sequential. After every page that does not end the run the
/// loop sleeps `cfg.request_delay`. The page that crosses `cfg.max_posts` is kept whole.
/// Errors never escape: they end the run and are reported through [`FetchOutcome::stop`].
pub async fn fetch_all<S>(source: &S, cfg: &FeedConfig) -> FetchOutcome
where
    S: PageSource + ?Sized,
{
    ensure_metrics_described();

    let limit = cfg.page_size;
    let mut posts: Vec<Post> = Vec::new();
    let mut offset: u32 = 0;
    let mut pages_fetched = 0usize;

    let stop = loop {
        let batch = match source.fetch_page(limit, offset).await {
            Ok(batch) => batch,
            Err(e) => break StopReason::Failed(e),
        };
        if batch.is_empty() {
            break StopReason::Exhausted;
        }

        pages_fetched += 1;
        counter!("feed_pages_fetched_total").increment(1);
        posts.extend(batch);

        if posts.len() >= cfg.max_posts {
            break StopReason::CapReached;
        }

        offset = match offset.checked_add(limit) {
            Some(next) => next,
            None => break StopReason::Failed(anyhow::anyhow!("page offset overflow at {offset}")),
        };

        tokio::time::sleep(cfg.request_delay).await;
    };

    let outcome = FetchOutcome {
        posts,
        pages_fetched,
        stop,
    };

    if let Some(msg) = outcome.diagnostic() {
        counter!("feed_fetch_errors_total").increment(1);
        tracing::warn!(
            provider = source.name(),
            fetched = outcome.posts.len(),
            pages = outcome.pages_fetched,
            "{msg}"
        );
    } else {
        tracing::debug!(
            provider = source.name(),
            fetched = outcome.posts.len(),
            pages = outcome.pages_fetched,
            stop = %outcome.stop,
            "aggregation finished"
        );
    }

    outcome
}
