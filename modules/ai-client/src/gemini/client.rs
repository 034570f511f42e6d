use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use super::types::*;
use crate::error::{AiError, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

static RETRY_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)retry in (\d+(?:\.\d+)?)s").expect("valid regex"));

pub(crate) struct GeminiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!(model, "Gemini generateContent request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }
}

/// Map a non-2xx response onto the error taxonomy. Quota exhaustion becomes
/// `RateLimited` so callers can back off instead of giving up.
pub(crate) fn classify_error(status: u16, body: &str) -> AiError {
    let envelope: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    let exhausted = envelope
        .as_ref()
        .is_some_and(|e| e.error.status == "RESOURCE_EXHAUSTED");

    if status == 429 || exhausted {
        let retry_after = envelope
            .as_ref()
            .and_then(|e| retry_delay_from_details(&e.error.details))
            .or_else(|| retry_hint(&message));
        return AiError::RateLimited { retry_after };
    }

    AiError::Api { status, message }
}

/// Parse a "retry in 12.5s" hint out of an error message.
pub(crate) fn retry_hint(message: &str) -> Option<Duration> {
    let caps = RETRY_IN_RE.captures(message)?;
    let secs: f64 = caps[1].parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

fn retry_delay_from_details(details: &[serde_json::Value]) -> Option<Duration> {
    details
        .iter()
        .filter(|d| {
            d.get("@type")
                .and_then(|t| t.as_str())
                .is_some_and(|t| t.ends_with("RetryInfo"))
        })
        .filter_map(|d| d.get("retryDelay").and_then(|v| v.as_str()))
        .filter_map(|s| s.trim_end_matches('s').parse::<f64>().ok())
        .find_map(|secs| Duration::try_from_secs_f64(secs).ok())
}
