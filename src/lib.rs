// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod generator;
pub mod ingest;
pub mod persist;
pub mod views;

// ---- Re-exports for stable public API ----
pub use crate::config::{FeedConfig, OutputDirs};
pub use crate::generator::{generate, generate_with, BuildSummary};
pub use crate::ingest::types::{PageSource, Post};
pub use crate::ingest::{fetch_all, FetchOutcome, StopReason};
