//! LessWrong feed — binary entrypoint.
//! Runs the generator once against the current directory as the site source root.

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lesswrong_feed=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; only RUST_LOG is read from it.
    let _ = dotenvy::dotenv();
    init_tracing();

    let summary = lesswrong_feed::generate(Path::new("."), chrono::Utc::now()).await?;
    for path in &summary.asset_files {
        tracing::debug!(path = %path.display(), "asset ready");
    }
    Ok(())
}
