use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use ai_client::truncate_chars;
use showcase_common::{Candidate, Engagement, Platform};

use crate::traits::PostSearcher;

const LINKEDIN_API_URL: &str = "https://api.linkedin.com/v2";
const TITLE_CHARS: usize = 100;

/// LinkedIn v2 search with an OAuth bearer token. Only useful for accounts
/// with search access, so it runs as the fallback behind SerpAPI.
pub struct LinkedInApi {
    access_token: String,
    client: reqwest::Client,
    base_url: String,
}

impl LinkedInApi {
    pub fn new(access_token: &str) -> Result<Self> {
        Ok(Self {
            access_token: access_token.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .context("Failed to build LinkedIn HTTP client")?,
            base_url: LINKEDIN_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl PostSearcher for LinkedInApi {
    fn name(&self) -> &'static str {
        "linkedin-api"
    }

    async fn search_posts(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>> {
        info!(query, max_results, "LinkedIn API search");

        let count = max_results.to_string();
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .bearer_auth(&self.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .query(&[
                ("keywords", query),
                ("q", "all"),
                ("count", count.as_str()),
                ("start", "0"),
            ])
            .send()
            .await
            .context("LinkedIn API request failed")?;

        match resp.status() {
            reqwest::StatusCode::UNAUTHORIZED => {
                warn!("LinkedIn API authentication failed, check LINKEDIN_ACCESS_TOKEN");
                return Ok(Vec::new());
            }
            reqwest::StatusCode::FORBIDDEN => {
                warn!("LinkedIn API access denied, check the app's permissions");
                return Ok(Vec::new());
            }
            _ => {}
        }

        let data: Value = resp
            .error_for_status()
            .context("LinkedIn API returned an error")?
            .json()
            .await
            .context("Failed to parse LinkedIn API response")?;

        let results = posts_from_elements(&data);
        info!(query, count = results.len(), "LinkedIn API search complete");
        Ok(results)
    }
}

/// The response shape depends on the caller's access level, so it is read
/// loosely: anything without a target or post text is skipped.
pub(crate) fn posts_from_elements(data: &Value) -> Vec<Candidate> {
    let Some(elements) = data.get("elements").and_then(Value::as_array) else {
        return Vec::new();
    };

    elements
        .iter()
        .filter_map(|element| {
            let target = element.get("target").filter(|t| is_present(t))?;
            let text = target
                .pointer("/text/text")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())?;

            let (creator, creator_url) = match target.get("author") {
                Some(Value::String(name)) => (name.clone(), String::new()),
                Some(Value::Object(author)) => (
                    str_field(author.get("name")).unwrap_or("Unknown").to_string(),
                    str_field(author.get("url")).unwrap_or_default().to_string(),
                ),
                _ => ("Unknown".to_string(), String::new()),
            };

            let url = match str_field(target.get("url")).filter(|u| !u.is_empty()) {
                Some(url) => url.to_string(),
                None => match target.get("id").filter(|id| is_present(id)) {
                    Some(Value::String(id)) => format!("https://www.linkedin.com/feed/update/{id}"),
                    Some(id) => format!("https://www.linkedin.com/feed/update/{id}"),
                    None => String::new(),
                },
            };

            let counts = target.pointer("/socialMetadata/engagement");
            let count = |key: &str| {
                counts
                    .and_then(|c| c.get(key))
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
            };

            let thumbnail = target
                .pointer("/images/0/url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let published_at = match target.pointer("/created/time") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => Utc::now().to_rfc3339(),
            };

            let title = if text.chars().count() > TITLE_CHARS {
                format!("{}...", truncate_chars(text, TITLE_CHARS))
            } else {
                text.to_string()
            };

            Some(Candidate {
                title,
                description: text.to_string(),
                url,
                thumbnail,
                creator,
                creator_url,
                platform: Platform::LinkedIn,
                published_at,
                engagement: Engagement::new(
                    count("viewCount"),
                    count("likeCount"),
                    count("commentCount"),
                ),
            })
        })
        .collect()
}

fn str_field(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
