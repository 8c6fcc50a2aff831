// tests/generator_e2e.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use chrono::{TimeZone, Utc};
use lesswrong_feed::ingest::providers::lesswrong::LessWrongClient;
use lesswrong_feed::{generate_with, FeedConfig, OutputDirs, StopReason};
use serde_json::{json, Value};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/graphql")
}

fn results(offset: u64, limit: u64) -> Value {
    let posts: Vec<Value> = (offset..offset + limit)
        .map(|i| {
            let created = if i % 2 == 0 {
                "2024-05-07T09:00:00.000Z"
            } else {
                "2023-01-01T00:00:00.000Z"
            };
            json!({
                "_id": format!("lw{i}"),
                "title": format!("Post {i}"),
                "slug": format!("post-{i}"),
                "baseScore": i * 10,
                "url": null,
                "createdAt": created,
            })
        })
        .collect();
    json!({ "data": { "posts": { "results": posts } } })
}

/// First page is fine, second comes back truncated.
async fn flaky(
    State(hits): State<Arc<AtomicUsize>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let n = hits.fetch_add(1, Ordering::SeqCst);
    let offset = body["variables"]["offset"].as_u64().unwrap_or(0);
    let limit = body["variables"]["limit"].as_u64().unwrap_or(0);
    if n == 0 {
        (StatusCode::OK, results(offset, limit).to_string())
    } else {
        (StatusCode::OK, "{\"data\":{\"posts\":{\"results\":[".to_string())
    }
}

fn fast_cfg(endpoint: &str) -> FeedConfig {
    FeedConfig::default()
        .with_endpoint(endpoint)
        .with_page_size(20)
        .with_request_delay(Duration::from_millis(5))
}

#[tokio::test]
async fn malformed_second_page_still_writes_partial_output() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/graphql", post(flaky))
        .with_state(hits.clone());
    let endpoint = serve(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let dirs = OutputDirs::for_site(tmp.path());
    let cfg = fast_cfg(&endpoint);
    let client = LessWrongClient::from_config(&cfg).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();

    let summary = generate_with(&client, &cfg, &dirs, now)
        .await
        .expect("network failure must not fail the build");

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(summary.total, 20);
    assert!(matches!(summary.stop, StopReason::Failed(_)));
    // scores 0..190 step 10 -> 100..=190 qualifies
    assert_eq!(summary.high_score, 10);
    // even ids are from May 7
    assert_eq!(summary.recent, 10);

    let all: Value = serde_json::from_str(
        &std::fs::read_to_string(dirs.assets.join("lesswrong_posts.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 20);
    assert_eq!(summary.asset_files.len(), 3);
    assert!(summary.asset_files.iter().all(|p| p.exists()));
}

#[tokio::test]
async fn error_status_degrades_to_empty_output() {
    let app = Router::new().route(
        "/graphql",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let endpoint = serve(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let dirs = OutputDirs::for_site(tmp.path());
    let cfg = fast_cfg(&endpoint);
    let client = LessWrongClient::from_config(&cfg).unwrap();

    let summary = generate_with(&client, &cfg, &dirs, Utc::now()).await.unwrap();

    assert_eq!(summary.total, 0);
    assert!(matches!(summary.stop, StopReason::Exhausted));
    for dir in [&dirs.data, &dirs.assets] {
        for name in [
            "lesswrong_posts.json",
            "lesswrong_high_karma_posts.json",
            "lesswrong_recent_posts.json",
        ] {
            assert_eq!(std::fs::read_to_string(dir.join(name)).unwrap(), "[]");
        }
    }
}

#[tokio::test]
async fn cap_is_honoured_end_to_end() {
    let app = Router::new().route(
        "/graphql",
        post(|Json(body): Json<Value>| async move {
            let offset = body["variables"]["offset"].as_u64().unwrap_or(0);
            let limit = body["variables"]["limit"].as_u64().unwrap_or(0);
            Json(results(offset, limit))
        }),
    );
    let endpoint = serve(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let dirs = OutputDirs::for_site(tmp.path());
    let cfg = fast_cfg(&endpoint).with_max_posts(50);
    let client = LessWrongClient::from_config(&cfg).unwrap();

    let summary = generate_with(&client, &cfg, &dirs, Utc::now()).await.unwrap();

    // 20, 40, 60: the page crossing the cap is kept whole.
    assert_eq!(summary.total, 60);
    assert!(matches!(summary.stop, StopReason::CapReached));
}
