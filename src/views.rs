//! views.rs — derived subsets of the fetched collection (high karma, last week).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::config::FeedConfig;
use crate::ingest::types::Post;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Views {
    pub high_score: Vec<Post>,
    pub recent: Vec<Post>,
}

/// Compute both views from `all`, relative to `now`. Order of `all` is preserved.
pub fn derive_views(all: &[Post], now: DateTime<Utc>, cfg: &FeedConfig) -> Views {
    Views {
        high_score: high_score(all, cfg.score_threshold),
        recent: recent(all, now, cfg.recent_window),
    }
}

/// Posts with a score present and `>= threshold`.
pub fn high_score(all: &[Post], threshold: i64) -> Vec<Post> {
    all.iter()
        .filter(|p| p.score_at_least(threshold))
        .cloned()
        .collect()
}

/// Posts created strictly after `now - window`. Missing or unparseable timestamps are skipped.
pub fn recent(all: &[Post], now: DateTime<Utc>, window: Duration) -> Vec<Post> {
    let cutoff = now - window;
    all.iter()
        .filter(|p| {
            p.created_at
                .as_deref()
                .and_then(parse_timestamp)
                .is_some_and(|ts| ts > cutoff)
        })
        .cloned()
        .collect()
}

// Tried after RFC 3339, before the zone-less fallbacks.
const OFFSET_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

// Zone-less (or `Z`-suffixed) forms, read as UTC.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse the ISO-8601 shapes a `createdAt` can take.
///
/// RFC 3339 first (what the API sends), then offsets with minute precision,
/// then UTC forms: zone-less or `Z`, minute precision, date only (midnight),
/// and ISO basic format (`20240507T090000Z`).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_LAYOUTS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    let body = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')).unwrap_or(s);
    let expanded = expand_basic(body);
    parse_naive(expanded.as_deref().unwrap_or(body)).map(|naive| naive.and_utc())
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_LAYOUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `20240507T0900[00]` -> `2024-05-07T09:00[:00]`; `None` if `s` is not ISO basic format.
fn expand_basic(s: &str) -> Option<String> {
    let (date, time) = match s.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (s, None),
    };
    let all_digits = |x: &str| x.bytes().all(|b| b.is_ascii_digit());
    if date.len() != 8 || !all_digits(date) {
        return None;
    }
    let mut out = format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..]);
    if let Some(t) = time {
        if !matches!(t.len(), 4 | 6) || !all_digits(t) {
            return None;
        }
        out.push_str(&format!("T{}:{}", &t[..2], &t[2..4]));
        if t.len() == 6 {
            out.push(':');
            out.push_str(&t[4..]);
        }
    }
    Some(out)
}
