use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient::{count, null_as_default, score};

// --- Platform ---

/// Where an example was found. Unknown names read from disk are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    YouTube,
    LinkedIn,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::LinkedIn => "LinkedIn",
            Platform::Other(name) => name,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Other(String::new())
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        match s.as_str() {
            "YouTube" => Platform::YouTube,
            "LinkedIn" => Platform::LinkedIn,
            _ => Platform::Other(s),
        }
    }
}

impl From<Platform> for String {
    fn from(p: Platform) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Build Complexity ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildComplexity {
    NoCode,
    LowCode,
    FullBuild,
    #[default]
    Unknown,
}

impl BuildComplexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildComplexity::NoCode => "No-code",
            BuildComplexity::LowCode => "Low-code",
            BuildComplexity::FullBuild => "Full Build",
            BuildComplexity::Unknown => "Unknown",
        }
    }
}

impl From<String> for BuildComplexity {
    fn from(s: String) -> Self {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "nocode" => BuildComplexity::NoCode,
            "lowcode" => BuildComplexity::LowCode,
            "fullbuild" | "fullcode" => BuildComplexity::FullBuild,
            _ => BuildComplexity::Unknown,
        }
    }
}

impl From<BuildComplexity> for String {
    fn from(c: BuildComplexity) -> Self {
        c.as_str().to_string()
    }
}

impl std::fmt::Display for BuildComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Engagement ---

/// View / like / comment counts attached to a source post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagement {
    #[serde(deserialize_with = "count")]
    pub view_count: u64,
    #[serde(deserialize_with = "count")]
    pub like_count: u64,
    #[serde(deserialize_with = "count")]
    pub comment_count: u64,
}

impl Engagement {
    pub fn new(view_count: u64, like_count: u64, comment_count: u64) -> Self {
        Self {
            view_count,
            like_count,
            comment_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.view_count == 0 && self.like_count == 0 && self.comment_count == 0
    }
}

// --- Candidate ---

/// One raw search hit, before classification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail: String,
    pub creator: String,
    pub creator_url: String,
    pub platform: Platform,
    pub published_at: String,
    #[serde(flatten)]
    pub engagement: Engagement,
}

// --- Example Record ---

/// A curated instance of an AI-assisted build, as stored in the snapshot file.
///
/// Every field is optional on read, `null` reads as empty, and scores and
/// counts accept floats or numeric strings, so hand-edited or older snapshots
/// still load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExampleRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ai_tools_used: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub category_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub source_platform: Platform,
    #[serde(deserialize_with = "null_as_default")]
    pub original_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creator_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creator_link: String,
    #[serde(deserialize_with = "null_as_default")]
    pub thumbnail_url: String,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "score")]
    pub relevance_score: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub build_complexity: BuildComplexity,
    #[serde(deserialize_with = "null_as_default")]
    pub is_no_code_low_code: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project_summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project_evidence: String,
    #[serde(flatten)]
    pub engagement: Engagement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_category: Option<String>,
}

impl ExampleRecord {
    pub fn is_youtube(&self) -> bool {
        self.source_platform == Platform::YouTube
    }

    /// Lowercased title + description, the haystack for keyword heuristics.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC).
/// Anything unparseable becomes `None` instead of failing the whole file.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_timestamp(&s)))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_unknown_names() {
        let p: Platform = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(p, Platform::Other("Medium".to_string()));
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"Medium\"");
        assert_eq!(
            serde_json::from_str::<Platform>("\"YouTube\"").unwrap(),
            Platform::YouTube
        );
    }

    #[test]
    fn build_complexity_is_forgiving() {
        for (raw, expected) in [
            ("No-code", BuildComplexity::NoCode),
            ("low code", BuildComplexity::LowCode),
            ("Full Build", BuildComplexity::FullBuild),
            ("whatever", BuildComplexity::Unknown),
        ] {
            assert_eq!(BuildComplexity::from(raw.to_string()), expected);
        }
    }

    #[test]
    fn record_loads_from_sparse_json() {
        let json = r#"{
            "title": "Habit tracker",
            "source_platform": "YouTube",
            "original_url": "https://www.youtube.com/watch?v=abc",
            "view_count": 1200,
            "date_added": "2025-03-01T10:20:30.123456"
        }"#;
        let record: ExampleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Habit tracker");
        assert!(record.is_youtube());
        assert_eq!(record.engagement.view_count, 1200);
        assert_eq!(record.engagement.like_count, 0);
        assert_eq!(record.build_complexity, BuildComplexity::Unknown);
        assert!(record.date_added.is_some());
        assert!(record.primary_category.is_none());
    }

    #[test]
    fn record_serializes_flat_engagement() {
        let record = ExampleRecord {
            original_url: "https://example.com".to_string(),
            engagement: Engagement::new(10, 2, 1),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["view_count"], 10);
        assert_eq!(value["comment_count"], 1);
        assert!(value.get("engagement").is_none());
        assert!(value.get("primary_category").is_none());
    }

    #[test]
    fn record_tolerates_loose_scores_and_nulls() {
        let json = r#"{
            "title": "Invoice bot",
            "relevance_score": 8.5,
            "thumbnail_url": null,
            "ai_tools_used": null,
            "source_platform": null,
            "build_complexity": null,
            "is_no_code_low_code": null,
            "view_count": "1200",
            "like_count": null,
            "primary_category": null
        }"#;
        let record: ExampleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.relevance_score, 9);
        assert_eq!(record.thumbnail_url, "");
        assert!(record.ai_tools_used.is_empty());
        assert_eq!(record.source_platform, Platform::default());
        assert_eq!(record.build_complexity, BuildComplexity::Unknown);
        assert_eq!(record.engagement, Engagement::new(1200, 0, 0));
        assert!(record.primary_category.is_none());

        let scored: ExampleRecord = serde_json::from_str(r#"{"relevance_score": "8"}"#).unwrap();
        assert_eq!(scored.relevance_score, 8);
    }

    #[test]
    fn bad_timestamp_is_dropped_not_fatal() {
        let record: ExampleRecord =
            serde_json::from_str(r#"{"date_added": "yesterday"}"#).unwrap();
        assert!(record.date_added.is_none());
    }
}
