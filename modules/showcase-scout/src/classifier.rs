//! Model-backed relevance scoring for search candidates.

use std::time::Duration;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ai_client::{truncate_chars, AiError, Gemini};
use showcase_common::{BuildComplexity, Candidate};

use crate::profiles::{CATEGORY_TAGS, TARGET_TOOLS};
use crate::traits::Classifier;

pub const FALLBACK_MODEL: &str = "gemini-1.5-flash";
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);
const RATE_LIMIT_PADDING: Duration = Duration::from_secs(2);
const DESCRIPTION_FALLBACK_CHARS: usize = 200;

const SYSTEM_PROMPT: &str = "\
You are an analyst helping a research team curate daily AI project showcases. \
Return concise, factual JSON that follows the provided schema. \
Never invent tool names, and only use categories the description clearly supports. \
Prioritize no-code and low-code relevance.\n\n\
A post counts as a real project only if it shows something actually BUILT: a product, app, \
automation or system. Posts that only announce features, share updates, or demonstrate \
capabilities without a concrete artifact are not real projects; set is_real_project to false \
for them, and for pure 'how to use' content.\n\n\
project_evidence must name what was built (for example 'built a design system plugin', \
'created an icon library', 'made a UI component generator').\n\n\
Posts mentioning 'cursor' are about the mouse pointer unless they clearly mean the Cursor AI \
editor; exclude the former.\n\n\
Always capture the digital artifact that was created: its name, purpose and audience.";

const USER_PREAMBLE: &str = "Analyze the following AI project content and respond with JSON only.";

/// What the model says about one candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Classification {
    /// integer 0-10: how clearly this shows something built with AI tools
    #[serde(deserialize_with = "showcase_common::lenient::score")]
    #[schemars(with = "u8")]
    pub relevance_score: u8,
    /// AI tools named in the content
    pub ai_tools_used: Vec<String>,
    /// tags chosen from the provided category list
    pub category_tags: Vec<String>,
    pub is_no_code_low_code: bool,
    /// true only if a concrete project, app or automation was built and shown
    pub is_real_project: bool,
    /// concise name of the artifact built, e.g. 'AI-powered travel itinerary app'
    pub project_name: String,
    /// one sentence on what the artifact does and for whom
    pub project_summary: String,
    /// brief justification citing the specific demo or artifact
    pub project_evidence: String,
    /// two or three sentence description
    pub enhanced_description: String,
    /// one of: No-code, Low-code, Full Build
    #[schemars(with = "String")]
    pub build_complexity: BuildComplexity,
}

impl Classification {
    /// Zero-score result used whenever the model can't be reached or read.
    pub fn fallback(candidate: &Candidate) -> Self {
        Self {
            enhanced_description: truncate_chars(&candidate.description, DESCRIPTION_FALLBACK_CHARS)
                .to_string(),
            ..Default::default()
        }
    }

    fn fill_defaults(mut self, candidate: &Candidate) -> Self {
        if self.enhanced_description.trim().is_empty() {
            self.enhanced_description =
                truncate_chars(&candidate.description, DESCRIPTION_FALLBACK_CHARS).to_string();
        }
        self.project_name = self.project_name.trim().to_string();
        self.project_summary = self.project_summary.trim().to_string();
        self
    }
}

// ---------------------------------------------------------------------------
// Gemini-backed classifier
// ---------------------------------------------------------------------------

pub struct GeminiClassifier {
    gemini: Gemini,
    rate_limit_padding: Duration,
}

impl GeminiClassifier {
    pub fn new(gemini: Gemini) -> Self {
        Self {
            gemini,
            rate_limit_padding: RATE_LIMIT_PADDING,
        }
    }

    /// Extra wait added to the server's retry hint.
    pub fn with_rate_limit_padding(mut self, padding: Duration) -> Self {
        self.rate_limit_padding = padding;
        self
    }

    /// Ping `model`; if it isn't served for this key, fall back to
    /// [`FALLBACK_MODEL`] without checking again.
    pub async fn connect(api_key: &str, model: &str) -> Self {
        let gemini = Gemini::new(api_key, model);
        match gemini.ping().await {
            Ok(()) => {
                info!(model, "Gemini model ready");
                Self::new(gemini)
            }
            Err(e) => {
                warn!(model, fallback = FALLBACK_MODEL, error = %e, "Gemini model unavailable, falling back");
                Self::new(gemini.with_model(FALLBACK_MODEL))
            }
        }
    }

    pub fn model(&self) -> &str {
        self.gemini.model()
    }

    async fn analyze(&self, candidate: &Candidate) -> ai_client::Result<Classification> {
        self.gemini
            .extract::<Classification>(SYSTEM_PROMPT, user_parts(candidate))
            .await
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, candidate: &Candidate) -> Classification {
        let first = match self.analyze(candidate).await {
            Err(AiError::RateLimited { retry_after: Some(wait) }) => {
                let wait = rate_limit_wait(wait, self.rate_limit_padding);
                warn!(title = %truncate_chars(&candidate.title, 60), wait_secs = wait.as_secs(), "Gemini rate limited, waiting to retry");
                tokio::time::sleep(wait).await;
                self.analyze(candidate).await
            }
            other => other,
        };

        match first {
            Ok(c) => c.fill_defaults(candidate),
            Err(e) => {
                warn!(url = candidate.url.as_str(), error = %e, "Classification failed, scoring as zero");
                Classification::fallback(candidate)
            }
        }
    }
}

/// Stand-in when no model key is configured: every candidate scores zero.
pub struct NoopClassifier;

#[async_trait]
impl Classifier for NoopClassifier {
    async fn classify(&self, candidate: &Candidate) -> Classification {
        Classification::fallback(candidate)
    }
}

// ---------------------------------------------------------------------------
// Keyword classifier
// ---------------------------------------------------------------------------

/// Tool names and the lowercase fragments that count as a mention.
const TOOL_MENTIONS: &[(&str, &[&str])] = &[
    ("Cursor", &["cursor"]),
    ("Lovable", &["lovable"]),
    ("v0", &["v0"]),
    ("Claude", &["claude"]),
    ("ChatGPT", &["chatgpt", "gpt"]),
    ("Replit", &["replit"]),
    ("Make.com", &["make.com", "make"]),
    ("n8n", &["n8n"]),
];
const KEYWORD_SCORE: u8 = 7;
const KEYWORD_TAGS: &[&str] = &["Code Generation", "AI Project"];
const KEYWORD_DESCRIPTION_CHARS: usize = 300;
const KEYWORD_NAME_CHARS: usize = 50;
const KEYWORD_SUMMARY_CHARS: usize = 150;

/// Model-free scoring for when Gemini is unavailable or out of quota. Every
/// candidate passes with a fixed score; tools come from keyword mentions in
/// the title and description.
pub struct KeywordClassifier;

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, candidate: &Candidate) -> Classification {
        let description = truncate_chars(&candidate.description, KEYWORD_DESCRIPTION_CHARS);
        let text = format!("{} {}", candidate.title, description).to_lowercase();

        let mut tools: Vec<String> = TOOL_MENTIONS
            .iter()
            .filter(|(_, fragments)| fragments.iter().any(|f| text.contains(f)))
            .map(|(tool, _)| tool.to_string())
            .collect();
        if tools.is_empty() {
            tools.push("AI Tools".to_string());
        }

        let project_summary = if description.is_empty() {
            format!("AI coding project shared on {}", candidate.platform)
        } else {
            truncate_chars(description, KEYWORD_SUMMARY_CHARS).to_string()
        };

        Classification {
            relevance_score: KEYWORD_SCORE,
            ai_tools_used: tools,
            category_tags: KEYWORD_TAGS.iter().map(|t| t.to_string()).collect(),
            is_no_code_low_code: true,
            is_real_project: true,
            project_name: truncate_chars(&candidate.title, KEYWORD_NAME_CHARS).to_string(),
            project_summary,
            project_evidence: format!("Shared on {}", candidate.platform),
            enhanced_description: if description.is_empty() {
                candidate.title.clone()
            } else {
                description.to_string()
            },
            build_complexity: BuildComplexity::LowCode,
        }
    }
}

/// Hinted wait plus padding, capped at a minute.
pub fn rate_limit_wait(hint: Duration, padding: Duration) -> Duration {
    (hint + padding).min(MAX_RATE_LIMIT_WAIT)
}

/// The preamble and the candidate payload. The schema part is appended by
/// `Gemini::extract`.
pub fn user_parts(candidate: &Candidate) -> Vec<String> {
    let payload = serde_json::json!({
        "title": candidate.title,
        "description": candidate.description,
        "url": candidate.url,
        "platform": candidate.platform.as_str(),
        "target_tools": TARGET_TOOLS,
        "category_tags": CATEGORY_TAGS,
    });
    vec![USER_PREAMBLE.to_string(), payload.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::StructuredOutput;
    use showcase_common::Platform;

    fn candidate() -> Candidate {
        Candidate {
            title: "I built a habit tracker with Cursor".to_string(),
            description: "x".repeat(300),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            platform: Platform::YouTube,
            ..Default::default()
        }
    }

    #[test]
    fn sparse_model_output_gets_defaults() {
        let parsed: Classification =
            serde_json::from_str(r#"{"relevance_score": "8", "is_real_project": true, "project_name": "  Habit tracker "}"#)
                .unwrap();
        let c = parsed.fill_defaults(&candidate());

        assert_eq!(c.relevance_score, 8);
        assert!(c.ai_tools_used.is_empty());
        assert_eq!(c.build_complexity, BuildComplexity::Unknown);
        assert_eq!(c.project_name, "Habit tracker");
        assert_eq!(c.enhanced_description.chars().count(), 200);
    }

    #[test]
    fn score_is_clamped_and_rounded() {
        let high: Classification = serde_json::from_str(r#"{"relevance_score": 14}"#).unwrap();
        let frac: Classification = serde_json::from_str(r#"{"relevance_score": 6.6}"#).unwrap();
        let junk: Classification = serde_json::from_str(r#"{"relevance_score": null}"#).unwrap();
        assert_eq!(high.relevance_score, 10);
        assert_eq!(frac.relevance_score, 7);
        assert_eq!(junk.relevance_score, 0);
    }

    #[test]
    fn complexity_parses_model_spelling() {
        let c: Classification =
            serde_json::from_str(r#"{"build_complexity": "Full Build"}"#).unwrap();
        assert_eq!(c.build_complexity, BuildComplexity::FullBuild);
    }

    #[test]
    fn fallback_is_zero_score() {
        let c = Classification::fallback(&candidate());
        assert_eq!(c.relevance_score, 0);
        assert!(!c.is_real_project);
        assert_eq!(c.enhanced_description.len(), 200);
    }

    #[tokio::test]
    async fn keyword_classifier_detects_tools_and_passes() {
        let post = Candidate {
            title: "Shipped a CRM with Lovable and GPT-4".to_string(),
            description: String::new(),
            platform: Platform::LinkedIn,
            ..Default::default()
        };
        let c = KeywordClassifier.classify(&post).await;

        assert_eq!(c.relevance_score, 7);
        assert_eq!(c.ai_tools_used, vec!["Lovable", "ChatGPT"]);
        assert_eq!(c.build_complexity, BuildComplexity::LowCode);
        assert_eq!(c.project_summary, "AI coding project shared on LinkedIn");
        assert_eq!(c.enhanced_description, post.title);
        assert_eq!(crate::filters::rejection(&c), None);
    }

    #[tokio::test]
    async fn keyword_classifier_without_tool_mentions() {
        let c = KeywordClassifier
            .classify(&Candidate {
                title: "Weekend side project".to_string(),
                description: "A habit tracker for my team".to_string(),
                ..Default::default()
            })
            .await;

        assert_eq!(c.ai_tools_used, vec!["AI Tools"]);
        assert_eq!(c.project_name, "Weekend side project");
        assert_eq!(c.project_summary, "A habit tracker for my team");
    }

    #[test]
    fn rate_limit_wait_is_capped() {
        assert_eq!(
            rate_limit_wait(Duration::from_secs(17), RATE_LIMIT_PADDING),
            Duration::from_secs(19)
        );
        assert_eq!(
            rate_limit_wait(Duration::from_secs(120), RATE_LIMIT_PADDING),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn user_payload_lists_tools_and_tags() {
        let parts = user_parts(&candidate());
        assert_eq!(parts.len(), 2);
        let payload: serde_json::Value = serde_json::from_str(&parts[1]).unwrap();
        assert_eq!(payload["platform"], "YouTube");
        assert_eq!(payload["target_tools"].as_array().unwrap().len(), TARGET_TOOLS.len());
        assert_eq!(payload["category_tags"][0], "Computer Vision");
    }

    #[test]
    fn schema_describes_fields() {
        let schema = Classification::gemini_schema();
        let props = &schema["properties"];
        assert_eq!(props["build_complexity"]["type"], "string");
        assert!(props["relevance_score"]["description"]
            .as_str()
            .unwrap()
            .contains("0-10"));
    }
}
