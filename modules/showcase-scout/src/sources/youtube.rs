use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use showcase_common::lenient::count;
use showcase_common::{Candidate, Engagement, Platform};

use crate::traits::VideoSearcher;

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const MAX_ATTEMPTS: u32 = 3;
const RETRY_STEP: Duration = Duration::from_secs(2);

/// YouTube Data API v3: `search` for ids, then `videos` for counts.
pub struct YouTubeSearcher {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    retry_step: Duration,
}

impl YouTubeSearcher {
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .context("Failed to build YouTube HTTP client")?,
            base_url: YOUTUBE_API_URL.to_string(),
            retry_step: RETRY_STEP,
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_step(mut self, step: Duration) -> Self {
        self.retry_step = step;
        self
    }

    /// One tiny search to confirm the key works.
    pub async fn ping(&self) -> Result<()> {
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("q", "AI"),
                ("type", "video"),
                ("maxResults", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("YouTube API request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("YouTube API returned {status}: {body}");
        }
        Ok(())
    }

    /// The search call, retried on 403 and transport errors. `None` means the
    /// daily quota is spent and the keyword should be skipped.
    async fn search_ids(
        &self,
        query: &str,
        max_results: usize,
        published_after: DateTime<Utc>,
    ) -> Result<Option<SearchResponse>> {
        let max_results = max_results.to_string();
        let published_after = published_after.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let sent = self
                .client
                .get(format!("{}/search", self.base_url))
                .query(&[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("order", "viewCount"),
                    ("maxResults", max_results.as_str()),
                    ("publishedAfter", published_after.as_str()),
                    ("key", self.api_key.as_str()),
                ])
                .send()
                .await;

            let resp = match sent {
                Ok(resp) => resp,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    let wait = self.retry_step * attempt;
                    warn!(query, attempt, wait_secs = wait.as_secs(), error = %e, "YouTube request failed, retrying");
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Err(e) => {
                    return Err(e).context(format!("YouTube search failed after {MAX_ATTEMPTS} attempts"))
                }
            };

            if resp.status() == reqwest::StatusCode::FORBIDDEN {
                let body = resp.text().await.unwrap_or_default();
                if is_quota_error(&body) {
                    warn!(query, "YouTube quota exhausted, skipping keyword");
                    return Ok(None);
                }
                if attempt < MAX_ATTEMPTS {
                    let wait = self.retry_step * attempt;
                    warn!(query, attempt, wait_secs = wait.as_secs(), "YouTube 403, retrying");
                    tokio::time::sleep(wait).await;
                    continue;
                }
                warn!(query, "YouTube 403 persisted, skipping keyword");
                return Ok(None);
            }

            let resp = resp.error_for_status().context("YouTube search returned an error")?;
            let data: SearchResponse = resp
                .json()
                .await
                .context("Failed to parse YouTube search response")?;
            return Ok(Some(data));
        }
    }

    async fn statistics(&self, ids: &[String]) -> Result<HashMap<String, Engagement>> {
        let joined = ids.join(",");
        let resp = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("part", "statistics"),
                ("id", joined.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("YouTube statistics request failed")?
            .error_for_status()
            .context("YouTube statistics returned an error")?;

        let data: VideosResponse = resp
            .json()
            .await
            .context("Failed to parse YouTube statistics response")?;

        Ok(data
            .items
            .into_iter()
            .map(|v| {
                let s = v.statistics;
                (v.id, Engagement::new(s.view_count, s.like_count, s.comment_count))
            })
            .collect())
    }
}

#[async_trait]
impl VideoSearcher for YouTubeSearcher {
    async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<Candidate>> {
        info!(query, max_results, "YouTube search");

        let Some(search) = self.search_ids(query, max_results, published_after).await? else {
            return Ok(Vec::new());
        };

        let ids: Vec<String> = search
            .items
            .iter()
            .filter_map(|item| item.id.video_id.clone())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let stats = self.statistics(&ids).await?;
        let results = to_candidates(search, &stats);

        info!(query, count = results.len(), "YouTube search complete");
        Ok(results)
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    #[serde(default)]
    statistics: Statistics,
}

// The API sends counts as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default, deserialize_with = "count")]
    view_count: u64,
    #[serde(default, deserialize_with = "count")]
    like_count: u64,
    #[serde(default, deserialize_with = "count")]
    comment_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

fn is_quota_error(body: &str) -> bool {
    let reason_says_quota = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error.errors.into_iter().next())
        .is_some_and(|d| d.reason.contains("quotaExceeded"));
    reason_says_quota || body.to_lowercase().contains("quota")
}

/// Join search hits with their statistics, most viewed first.
pub(crate) fn to_candidates(
    search: SearchResponse,
    stats: &HashMap<String, Engagement>,
) -> Vec<Candidate> {
    let mut results: Vec<Candidate> = search
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let snippet = item.snippet;
            Some(Candidate {
                url: format!("https://www.youtube.com/watch?v={video_id}"),
                thumbnail: snippet
                    .thumbnails
                    .get("high")
                    .map(|t| t.url.clone())
                    .unwrap_or_default(),
                creator_url: format!("https://www.youtube.com/channel/{}", snippet.channel_id),
                creator: snippet.channel_title,
                title: snippet.title,
                description: snippet.description,
                platform: Platform::YouTube,
                published_at: snippet.published_at,
                engagement: stats.get(&video_id).copied().unwrap_or_default(),
            })
        })
        .collect();

    results.sort_by(|a, b| b.engagement.view_count.cmp(&a.engagement.view_count));
    results
}
