//! Searchers and the Gemini classifier against a local HTTP server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use ai_client::Gemini;
use showcase_common::{Candidate, Engagement, Platform};
use showcase_scout::classifier::GeminiClassifier;
use showcase_scout::sources::{LinkedInApi, SerpSearcher, YouTubeSearcher};
use showcase_scout::testing::MockEngagement;
use showcase_scout::traits::{Classifier, PostSearcher, VideoSearcher};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

/// A handler that counts its calls and always answers with `status` and `body`.
fn counted(
    hits: &Arc<AtomicUsize>,
    status: StatusCode,
    body: Value,
) -> axum::routing::MethodRouter {
    let hits = hits.clone();
    get(move || {
        let hits = hits.clone();
        let body = body.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (status, Json(body))
        }
    })
}

fn youtube(base: &str) -> YouTubeSearcher {
    YouTubeSearcher::new("yt-key")
        .unwrap()
        .with_base_url(base)
        .with_retry_step(Duration::ZERO)
}

// ---------------------------------------------------------------------------
// YouTube
// ---------------------------------------------------------------------------

#[tokio::test]
async fn youtube_search_joins_statistics() {
    let router = Router::new()
        .route(
            "/search",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q["order"], "viewCount");
                assert_eq!(q["key"], "yt-key");
                Json(json!({"items": [
                    {"id": {"videoId": "aaa"}, "snippet": {"title": "Small", "channelId": "UC1"}},
                    {"id": {"videoId": "bbb"}, "snippet": {"title": "Big", "channelId": "UC2"}}
                ]}))
            }),
        )
        .route(
            "/videos",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q["id"], "aaa,bbb");
                Json(json!({"items": [
                    {"id": "aaa", "statistics": {"viewCount": "10"}},
                    {"id": "bbb", "statistics": {"viewCount": "900", "likeCount": "12"}}
                ]}))
            }),
        );
    let base = serve(router).await;

    let results = youtube(&base).search_videos("ai app", 10, Utc::now()).await.unwrap();

    let titles: Vec<&str> = results.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Big", "Small"]);
    assert_eq!(results[0].engagement, Engagement::new(900, 12, 0));
}

#[tokio::test]
async fn youtube_quota_exhaustion_skips_keyword_without_retry() {
    let hits = Arc::new(AtomicUsize::new(0));
    let quota = json!({"error": {"code": 403, "errors": [{"reason": "quotaExceeded"}]}});
    let base = serve(Router::new().route("/search", counted(&hits, StatusCode::FORBIDDEN, quota))).await;

    let results = youtube(&base).search_videos("ai app", 10, Utc::now()).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn youtube_other_forbidden_is_retried_then_skipped() {
    let hits = Arc::new(AtomicUsize::new(0));
    let forbidden = json!({"error": {"code": 403, "errors": [{"reason": "forbidden"}]}});
    let base = serve(Router::new().route("/search", counted(&hits, StatusCode::FORBIDDEN, forbidden))).await;

    let results = youtube(&base).search_videos("ai app", 10, Utc::now()).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn youtube_dropped_connections_are_retried_then_fail() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    let result = youtube(&format!("http://{addr}"))
        .search_videos("ai app", 10, Utc::now())
        .await;

    assert!(result.is_err());
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
}

// ---------------------------------------------------------------------------
// SerpAPI
// ---------------------------------------------------------------------------

#[tokio::test]
async fn serp_keeps_post_links_and_attaches_engagement() {
    let post_url = "https://www.linkedin.com/posts/jane-doe_agent-activity-1";
    let router = Router::new().route(
        "/search",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            assert_eq!(q["engine"], "google");
            assert_eq!(q["q"], "site:linkedin.com/posts n8n agent");
            Json(json!({"organic_results": [
                {"link": "https://www.linkedin.com/posts/jane-doe_agent-activity-1",
                 "title": "My n8n agent", "snippet": "Built an agent"},
                {"link": "https://www.linkedin.com/in/jane-doe", "title": "Profile"}
            ]}))
        }),
    );
    let base = serve(router).await;
    let engagement = Arc::new(MockEngagement::new().on_url(post_url, Engagement::new(0, 40, 3)));

    let serp = SerpSearcher::new("serp-key", engagement)
        .unwrap()
        .with_base_url(&format!("{base}/search"));
    let results = serp.search_posts("n8n agent", 10).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].creator, "Jane Doe");
    assert_eq!(results[0].platform, Platform::LinkedIn);
    assert_eq!(results[0].engagement, Engagement::new(0, 40, 3));
}

#[tokio::test]
async fn serp_bad_request_is_an_error_after_one_call() {
    let hits = Arc::new(AtomicUsize::new(0));
    let body = json!({"error": "Invalid API key."});
    let base = serve(Router::new().route("/search", counted(&hits, StatusCode::BAD_REQUEST, body))).await;

    let serp = SerpSearcher::new("bad", Arc::new(MockEngagement::new()))
        .unwrap()
        .with_base_url(&format!("{base}/search"));
    let err = serp.search_posts("n8n agent", 10).await.unwrap_err();

    assert!(err.to_string().contains("Invalid API key."));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// LinkedIn API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn linkedin_api_sends_bearer_token() {
    let router = Router::new().route(
        "/search",
        get(|headers: HeaderMap| async move {
            assert_eq!(headers["authorization"], "Bearer li-token");
            assert_eq!(headers["x-restli-protocol-version"], "2.0.0");
            Json(json!({"elements": [
                {"target": {"text": {"text": "Shipped a Bolt prototype"},
                            "url": "https://www.linkedin.com/feed/update/1",
                            "author": {"name": "Sam Park"}}}
            ]}))
        }),
    );
    let base = serve(router).await;

    let api = LinkedInApi::new("li-token").unwrap().with_base_url(&base);
    let results = api.search_posts("bolt", 5).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].creator, "Sam Park");
}

#[tokio::test]
async fn linkedin_api_auth_failures_are_empty() {
    for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = serve(Router::new().route("/search", counted(&hits, status, json!({})))).await;

        let api = LinkedInApi::new("li-token").unwrap().with_base_url(&base);
        let results = api.search_posts("bolt", 5).await.unwrap();

        assert!(results.is_empty(), "{status}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

// ---------------------------------------------------------------------------
// Gemini classifier
// ---------------------------------------------------------------------------

fn candidate() -> Candidate {
    Candidate {
        title: "I built a habit tracker with Cursor".to_string(),
        description: "Walkthrough of the app".to_string(),
        url: "https://www.youtube.com/watch?v=abc".to_string(),
        platform: Platform::YouTube,
        ..Default::default()
    }
}

fn rate_limited() -> (StatusCode, Json<Value>) {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"error": {
            "code": 429,
            "message": "You exceeded your current quota.",
            "status": "RESOURCE_EXHAUSTED",
            "details": [{"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "0s"}]
        }})),
    )
}

fn answer(text: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})),
    )
}

/// Serves `limited` rate-limit responses, then a classification.
async fn gemini_server(hits: &Arc<AtomicUsize>, limited: usize) -> String {
    let hits = hits.clone();
    let router = Router::new().fallback(move || {
        let hits = hits.clone();
        async move {
            if hits.fetch_add(1, Ordering::SeqCst) < limited {
                rate_limited()
            } else {
                answer(r#"{"relevance_score": 8, "is_real_project": true, "project_name": "Habit tracker"}"#)
            }
        }
    });
    serve(router).await
}

fn classifier(base: &str) -> GeminiClassifier {
    GeminiClassifier::new(Gemini::new("gem-key", "gemini-test").with_base_url(base))
        .with_rate_limit_padding(Duration::ZERO)
}

#[tokio::test]
async fn gemini_rate_limit_is_retried_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = gemini_server(&hits, 1).await;

    let c = classifier(&base).classify(&candidate()).await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(c.relevance_score, 8);
    assert_eq!(c.project_name, "Habit tracker");
}

#[tokio::test]
async fn gemini_second_rate_limit_scores_zero() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = gemini_server(&hits, 2).await;

    let c = classifier(&base).classify(&candidate()).await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(c.relevance_score, 0);
    assert_eq!(c.enhanced_description, "Walkthrough of the app");
}
