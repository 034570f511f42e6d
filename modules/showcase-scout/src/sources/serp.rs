use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use ai_client::truncate_chars;
use showcase_common::{Candidate, Platform};

use crate::traits::{EngagementFetcher, PostSearcher};

const SERPAPI_URL: &str = "https://serpapi.com/search";

/// LinkedIn posts found through SerpAPI's Google engine with a site filter.
pub struct SerpSearcher {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    engagement: Arc<dyn EngagementFetcher>,
}

impl SerpSearcher {
    pub fn new(api_key: &str, engagement: Arc<dyn EngagementFetcher>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .context("Failed to build SerpAPI HTTP client")?,
            base_url: SERPAPI_URL.to_string(),
            engagement,
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    thumbnail: String,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpError {
    #[serde(default)]
    error: String,
}

#[async_trait]
impl PostSearcher for SerpSearcher {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    async fn search_posts(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>> {
        let q = format!("site:linkedin.com/posts {query}");
        info!(query = q.as_str(), max_results, "SerpAPI search");

        let num = max_results.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google"),
                ("q", q.as_str()),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .context("SerpAPI request failed")?;

        if resp.status() == reqwest::StatusCode::BAD_REQUEST {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SerpError>(&body)
                .map(|e| e.error)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            warn!(query, error = message.as_str(), "SerpAPI rejected the search");
            bail!("SerpAPI 400: {message}");
        }

        let data: SerpResponse = resp
            .error_for_status()
            .context("SerpAPI returned an error")?
            .json()
            .await
            .context("Failed to parse SerpAPI response")?;

        let mut results = linkedin_posts(data);
        for candidate in &mut results {
            candidate.engagement = self.engagement.engagement(&candidate.url).await;
        }

        info!(query, count = results.len(), "SerpAPI search complete");
        Ok(results)
    }
}

/// Keep LinkedIn post links and shape them as candidates. Engagement is
/// filled in separately.
pub(crate) fn linkedin_posts(data: SerpResponse) -> Vec<Candidate> {
    data.organic_results
        .into_iter()
        .filter(|r| r.link.contains("linkedin.com/posts") || r.link.contains("linkedin.com/feed"))
        .map(|r| {
            let (creator, creator_url) = creator_from_post_url(&r.link);
            let title = if r.title.is_empty() {
                truncate_chars(&r.snippet, 100).to_string()
            } else {
                r.title.clone()
            };
            let description = if r.snippet.is_empty() { r.title } else { r.snippet };
            Candidate {
                title,
                description,
                url: r.link,
                thumbnail: r.thumbnail,
                creator,
                creator_url,
                platform: Platform::LinkedIn,
                published_at: r.date.unwrap_or_else(|| Utc::now().to_rfc3339()),
                engagement: Default::default(),
            }
        })
        .collect()
}

/// Creator name and profile URL guessed from a `/posts/{username}_{slug}` link.
pub fn creator_from_post_url(link: &str) -> (String, String) {
    let unknown = || ("Unknown".to_string(), String::new());

    let Ok(parsed) = Url::parse(link) else {
        return unknown();
    };
    let Some(mut segments) = parsed.path_segments() else {
        return unknown();
    };
    let Some(rest) = segments.find(|s| *s == "posts").and_then(|_| segments.next()) else {
        return unknown();
    };

    let username = if rest.contains('_') {
        rest.split('_').next()
    } else {
        rest.split('-').next()
    }
    .unwrap_or_default();

    if username.is_empty() {
        return unknown();
    }

    let name = title_case(&username.replace('-', " "));
    (name, format!("https://www.linkedin.com/in/{username}/"))
}

/// Uppercase the first letter of every run of letters, lowercase the rest
/// ("o'brien" becomes "O'Brien", "john2doe" becomes "John2Doe").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if prev_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }
    out
}
