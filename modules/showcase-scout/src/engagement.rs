//! Best-effort LinkedIn engagement scraping.
//!
//! LinkedIn serves no public counts API, so counts are pulled out of the post
//! page: first from embedded JSON-LD, then from a battery of text patterns.
//! Nothing here is authoritative. Every failure degrades to zero.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

use showcase_common::Engagement;

use crate::traits::EngagementFetcher;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MAX_JSON_DEPTH: usize = 5;
const PLAUSIBLE_LIKES: std::ops::RangeInclusive<u64> = 10..=100_000;
const MIN_PLAUSIBLE_VIEWS: u64 = 100;

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

pub struct HttpEngagementFetcher {
    client: reqwest::Client,
}

impl HttpEngagementFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build engagement HTTP client")?;
        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> Result<Option<String>> {
        let resp = self.client.get(url).send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            debug!(url, status = resp.status().as_u16(), "Engagement page not served");
            return Ok(None);
        }
        Ok(Some(resp.text().await?))
    }
}

#[async_trait]
impl EngagementFetcher for HttpEngagementFetcher {
    async fn engagement(&self, url: &str) -> Engagement {
        match self.fetch_html(url).await {
            Ok(Some(html)) => parse_engagement(&html),
            Ok(None) => Engagement::default(),
            Err(e) => {
                warn!(url, error = %e, "Engagement fetch failed");
                Engagement::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type=["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

static LIKE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d+(?:,\d+)*)\s*(?:reactions?|likes?)",
        r#""reactionCount":\s*(\d+)"#,
        r#""likeCount":\s*(\d+)"#,
        r#"data-reaction-count=["'](\d+)["']"#,
        r#"interactionCount["']?\s*:\s*(\d+)"#,
        r#"reactions["']?\s*[:\-]?\s*(\d+)"#,
        r"(\d+)\s*reactions?",
    ])
});

static COMMENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d+(?:,\d+)*)\s*comments?",
        r#""commentCount":\s*(\d+)"#,
        r#"data-comment-count=["'](\d+)["']"#,
        r#"comments["']?\s*[:\-]?\s*(\d+)"#,
    ])
});

static VIEW_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d+(?:,\d+)*)\s*views?",
        r#""viewCount":\s*(\d+)"#,
        r#"data-view-count=["'](\d+)["']"#,
        r#"views["']?\s*[:\-]?\s*(\d+)"#,
        r"(\d+)\s*views?",
        r#"viewCount["']?\s*:\s*(\d+)"#,
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
        .collect()
}

/// Extract view / like / comment counts from a post page.
pub fn parse_engagement(html: &str) -> Engagement {
    if let Some(found) = from_json_ld(html) {
        return found;
    }

    let likes = numbers(&LIKE_PATTERNS, html);
    let like_count = likes
        .iter()
        .copied()
        .filter(|n| PLAUSIBLE_LIKES.contains(n))
        .max()
        .or_else(|| likes.iter().copied().max())
        .unwrap_or(0);

    let comment_count = COMMENT_PATTERNS
        .iter()
        .filter_map(|re| numbers(std::slice::from_ref(re), html).into_iter().max())
        .find(|&n| n > 0)
        .unwrap_or(0);

    let views = numbers(&VIEW_PATTERNS, html);
    let view_count = views
        .iter()
        .copied()
        .filter(|&n| n >= MIN_PLAUSIBLE_VIEWS)
        .max()
        .or_else(|| views.iter().copied().max())
        .unwrap_or(0);

    Engagement::new(view_count, like_count, comment_count)
}

/// All first-group matches across `patterns`, commas stripped.
fn numbers(patterns: &[Regex], html: &str) -> Vec<u64> {
    patterns
        .iter()
        .flat_map(|re| re.captures_iter(html))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().replace(',', "").parse::<u64>().ok())
        .collect()
}

/// The first JSON-LD object carrying likes or comments.
fn from_json_ld(html: &str) -> Option<Engagement> {
    JSON_LD_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| serde_json::from_str::<Value>(m.as_str().trim()).ok())
        .filter(Value::is_object)
        .map(|value| search_counts(&value, 0))
        .find(|e| e.like_count > 0 || e.comment_count > 0)
}

/// Max of numeric fields whose key mentions view, like/reaction or comment,
/// searched through nested objects and arrays of objects.
fn search_counts(value: &Value, depth: usize) -> Engagement {
    let mut found = Engagement::default();
    if depth > MAX_JSON_DEPTH {
        return found;
    }
    let Some(map) = value.as_object() else {
        return found;
    };

    for (key, value) in map {
        match value {
            Value::Object(_) => merge_max(&mut found, search_counts(value, depth + 1)),
            Value::Array(items) => {
                for item in items.iter().filter(|i| i.is_object()) {
                    merge_max(&mut found, search_counts(item, depth + 1));
                }
            }
            Value::Number(n) => {
                let Some(n) = n.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64) else {
                    continue;
                };
                let key = key.to_lowercase();
                if key.contains("view") {
                    found.view_count = found.view_count.max(n);
                } else if key.contains("like") || key.contains("reaction") {
                    found.like_count = found.like_count.max(n);
                } else if key.contains("comment") {
                    found.comment_count = found.comment_count.max(n);
                }
            }
            _ => {}
        }
    }
    found
}

fn merge_max(into: &mut Engagement, other: Engagement) {
    into.view_count = into.view_count.max(other.view_count);
    into.like_count = into.like_count.max(other.like_count);
    into.comment_count = into.comment_count.max(other.comment_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_ld_block_wins() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
            {"@type": "SocialMediaPosting",
             "interactionStatistic": [
                {"@type": "InteractionCounter", "userInteractionCount": 3},
                {"likeCount": 42}
             ],
             "commentCount": 7,
             "author": {"stats": {"viewCount": 1500}}}
            </script></head>
            <body>9999 reactions</body></html>
        "#;
        assert_eq!(parse_engagement(html), Engagement::new(1500, 42, 7));
    }

    #[test]
    fn json_ld_without_likes_or_comments_falls_through() {
        let html = r#"
            <script type="application/ld+json">{"viewCount": 5000}</script>
            <span>568 reactions</span> <span>12 comments</span>
        "#;
        let e = parse_engagement(html);
        assert_eq!(e.like_count, 568);
        assert_eq!(e.comment_count, 12);
        assert_eq!(e.view_count, 5000);
    }

    #[test]
    fn likes_prefer_plausible_range() {
        let html = r#"<div data-reaction-count="250000"></div> 1,234 likes <i>3 reactions</i>"#;
        assert_eq!(parse_engagement(html).like_count, 1234);
    }

    #[test]
    fn likes_fall_back_to_overall_max() {
        let html = "only 4 reactions and 2 likes";
        assert_eq!(parse_engagement(html).like_count, 4);
    }

    #[test]
    fn comments_take_first_positive_pattern() {
        let html = r#"0 comments here <div data-comment-count="9"></div> "commentCount": 30"#;
        assert_eq!(parse_engagement(html).comment_count, 30);
    }

    #[test]
    fn views_ignore_small_numbers_when_large_exist() {
        let html = "2 views in the sidebar, 12,400 views on the post";
        assert_eq!(parse_engagement(html).view_count, 12_400);
        assert_eq!(parse_engagement("seen by 40 views").view_count, 40);
    }

    #[test]
    fn nothing_found_is_zero() {
        assert_eq!(parse_engagement("<html></html>"), Engagement::default());
    }

    #[test]
    fn deep_nesting_is_cut_off() {
        let mut value = serde_json::json!({"likeCount": 77});
        for _ in 0..7 {
            value = serde_json::json!({ "inner": value });
        }
        assert_eq!(search_counts(&value, 0).like_count, 0);
    }
}
