// src/persist.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::feed::{OutputDirs, ALL_POSTS_FILE, HIGH_KARMA_FILE, RECENT_FILE};
use crate::ingest::types::Post;

/// The three collections written per run.
#[derive(Debug, Clone, Copy)]
pub struct Collections<'a> {
    pub all: &'a [Post],
    pub high_score: &'a [Post],
    pub recent: &'a [Post],
}

impl<'a> Collections<'a> {
    fn named(&self) -> [(&'static str, &'a [Post]); 3] {
        [
            (ALL_POSTS_FILE, self.all),
            (HIGH_KARMA_FILE, self.high_score),
            (RECENT_FILE, self.recent),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersistReport {
    /// Every file written, data dir first.
    pub written: Vec<PathBuf>,
    /// Files under the assets dir; the site build registers these as static files.
    pub asset_files: Vec<PathBuf>,
}

/// Write each collection to both destinations, overwriting what is there.
/// Directory creation is idempotent. The six writes are not transactional.
pub fn persist(dirs: &OutputDirs, collections: &Collections<'_>) -> Result<PersistReport> {
    let mut report = PersistReport::default();

    // Serialize once, write twice.
    let mut payloads = Vec::with_capacity(3);
    for (name, posts) in collections.named() {
        let json = serde_json::to_string(posts).with_context(|| format!("serializing {name}"))?;
        payloads.push((name, json));
    }

    for dir in [&dirs.data, &dirs.assets] {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for (name, json) in &payloads {
            let path = dir.join(name);
            write_replace(&path, json.as_bytes())?;
            report.written.push(path);
        }
    }
    report.asset_files = payloads.iter().map(|(n, _)| dirs.assets.join(n)).collect();

    Ok(report)
}

fn write_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let res = write_tmp(&tmp, bytes).and_then(|()| {
        fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))
    });
    if res.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    res
}

fn write_tmp(tmp: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = fs::File::create(tmp).with_context(|| format!("creating {}", tmp.display()))?;
    f.write_all(bytes)
        .with_context(|| format!("writing {}", tmp.display()))?;
    Ok(())
}
