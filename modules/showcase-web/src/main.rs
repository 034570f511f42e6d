use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use showcase_common::{display_order, Config, ExampleRecord, SnapshotStore, DISPLAY_LIMIT};

mod templates;
use templates::*;

// --- App State ---

struct AppState {
    store: SnapshotStore,
}

impl AppState {
    /// Snapshot as shown to readers. Re-read on every call so a fresh crawl
    /// shows up without a restart. An unreadable snapshot shows as empty.
    fn examples(&self) -> Vec<ExampleRecord> {
        let mut examples = match self.store.load() {
            Ok(examples) => examples,
            Err(e) => {
                warn!(error = %e, "Failed to load snapshot");
                return Vec::new();
            }
        };
        display_order(&mut examples);
        examples.truncate(DISPLAY_LIMIT);
        examples
    }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("showcase=info".parse()?)
                .add_directive("web=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    let store = SnapshotStore::new(&config.data_dir);
    info!(
        data_dir = %store.data_dir().display(),
        snapshot_exists = store.latest_path().exists(),
        "Loaded configuration"
    );

    let app = router(Arc::new(AppState { store }));

    let addr = config.bind_addr();
    info!("Showcase web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/examples", get(api_examples))
        .route("/api/examples/{id}", get(api_example_detail))
        .route("/refresh", get(refresh))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

// --- Handlers ---

async fn index_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(render_index(&state.examples()))
}

async fn api_examples(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let examples = state.examples();
    Json(json!({
        "success": true,
        "count": examples.len(),
        "examples": examples,
    }))
}

/// Ids are display positions. Anything that isn't one, including
/// non-numeric or negative ids, is a 404.
async fn api_example_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let example = id
        .parse::<usize>()
        .ok()
        .and_then(|id| state.examples().into_iter().nth(id));

    match example {
        Some(example) => Json(json!({ "success": true, "example": example })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Example not found" })),
        )
            .into_response(),
    }
}

async fn refresh() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Run `scout crawl` to update the examples snapshot",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use showcase_common::{Engagement, Platform};
    use tower::ServiceExt;

    fn record(url: &str, platform: Platform, views: u64, score: u8) -> ExampleRecord {
        ExampleRecord {
            title: format!("Example {url}"),
            original_url: url.to_string(),
            source_platform: platform,
            relevance_score: score,
            engagement: Engagement::new(views, 0, 0),
            ..Default::default()
        }
    }

    fn app_with(records: &[ExampleRecord]) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        if !records.is_empty() {
            store.overwrite_latest(records).unwrap();
        }
        (router(Arc::new(AppState { store })), dir)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn api_lists_examples_youtube_first() {
        let (app, _dir) = app_with(&[
            record("li", Platform::LinkedIn, 0, 9),
            record("yt-small", Platform::YouTube, 10, 6),
            record("yt-big", Platform::YouTube, 9000, 7),
        ]);

        let (status, body) = get_json(app, "/api/examples").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 3);
        let urls: Vec<&str> = body["examples"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["original_url"].as_str().unwrap())
            .collect();
        assert_eq!(urls, vec!["yt-big", "yt-small", "li"]);
    }

    #[tokio::test]
    async fn api_truncates_to_display_limit() {
        let records: Vec<_> = (0..45)
            .map(|i| record(&format!("u{i}"), Platform::YouTube, i, 7))
            .collect();
        let (app, _dir) = app_with(&records);

        let (_, body) = get_json(app, "/api/examples").await;

        assert_eq!(body["count"], 40);
    }

    #[tokio::test]
    async fn detail_by_display_index() {
        let (app, _dir) = app_with(&[
            record("li", Platform::LinkedIn, 0, 9),
            record("yt", Platform::YouTube, 5, 6),
        ]);

        let (status, body) = get_json(app.clone(), "/api/examples/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["example"]["original_url"], "li");

        let (status, body) = get_json(app, "/api/examples/2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "error": "Example not found" }));
    }

    #[tokio::test]
    async fn non_numeric_ids_are_not_found() {
        let (app, _dir) = app_with(&[record("yt", Platform::YouTube, 5, 6)]);

        for uri in ["/api/examples/abc", "/api/examples/-1"] {
            let (status, body) = get_json(app.clone(), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({ "success": false, "error": "Example not found" }));
        }
    }

    #[tokio::test]
    async fn corrupt_snapshot_reads_as_empty() {
        let (app, dir) = app_with(&[]);
        std::fs::write(dir.path().join("found_examples_latest.json"), "[{not json").unwrap();

        let (status, body) = get_json(app.clone(), "/api/examples").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 0);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_snapshot_is_an_empty_list() {
        let (app, _dir) = app_with(&[]);
        let (status, body) = get_json(app, "/api/examples").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn index_renders_without_caching() {
        let (app, _dir) = app_with(&[record("yt", Platform::YouTube, 1_500_000, 8)]);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("1.5M views"));
    }

    #[tokio::test]
    async fn refresh_explains_how_to_crawl() {
        let (app, _dir) = app_with(&[]);
        let (status, body) = get_json(app, "/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("scout crawl"));
    }
}
