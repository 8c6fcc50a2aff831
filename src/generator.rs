//! One-shot build step: fetch, derive views, write JSON.
//!
//! The static-site build calls this once before rendering. Network trouble only ever
//! shrinks the output; the only errors returned are filesystem (and HTTP client setup)
//! failures, which are meant to fail the build.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::gauge;
use tracing::info;

use crate::config::{FeedConfig, OutputDirs};
use crate::ingest::providers::lesswrong::LessWrongClient;
use crate::ingest::types::PageSource;
use crate::ingest::{fetch_all, StopReason};
use crate::persist::{persist, Collections};
use crate::views::derive_views;

#[derive(Debug)]
pub struct BuildSummary {
    pub total: usize,
    pub high_score: usize,
    pub recent: usize,
    pub stop: StopReason,
    /// Paths to register as static files so they land in the rendered site.
    pub asset_files: Vec<PathBuf>,
}

/// Production entry: LessWrong endpoint, default knobs, `<site_root>/_data` + `<site_root>/assets`.
pub async fn generate(site_root: &Path, now: DateTime<Utc>) -> Result<BuildSummary> {
    let cfg = FeedConfig::default();
    let client = LessWrongClient::from_config(&cfg)?;
    generate_with(&client, &cfg, &OutputDirs::for_site(site_root), now).await
}

pub async fn generate_with<S>(
    source: &S,
    cfg: &FeedConfig,
    dirs: &OutputDirs,
    now: DateTime<Utc>,
) -> Result<BuildSummary>
where
    S: PageSource + ?Sized,
{
    info!(provider = source.name(), "fetching LessWrong posts");

    let outcome = fetch_all(source, cfg).await;
    let views = derive_views(&outcome.posts, now, cfg);

    let report = persist(
        dirs,
        &Collections {
            all: &outcome.posts,
            high_score: &views.high_score,
            recent: &views.recent,
        },
    )?;

    gauge!("feed_last_run_ts").set(now.timestamp().max(0) as f64);

    let summary = BuildSummary {
        total: outcome.posts.len(),
        high_score: views.high_score.len(),
        recent: views.recent.len(),
        stop: outcome.stop,
        asset_files: report.asset_files,
    };

    info!(
        total = summary.total,
        high_score = summary.high_score,
        recent = summary.recent,
        stop = %summary.stop,
        "fetched {} total posts, {} with {}+ karma, {} from last week",
        summary.total,
        summary.high_score,
        cfg.score_threshold,
        summary.recent
    );

    Ok(summary)
}
