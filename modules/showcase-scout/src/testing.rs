// Test mocks for the crawl pipeline.
//
// One mock per trait seam:
// - MockVideoSearcher (VideoSearcher): query → candidates, Err when unregistered
// - MockPostSearcher (PostSearcher): same, with a configurable name
// - MockEngagement (EngagementFetcher): url → counts, zeros when unregistered
// - MockClassifier (Classifier): url → classification, records every call
//
// Plus builders for candidates and classifications.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use showcase_common::{Candidate, Engagement, Platform};

use crate::classifier::Classification;
use crate::traits::{Classifier, EngagementFetcher, PostSearcher, VideoSearcher};

// ---------------------------------------------------------------------------
// MockVideoSearcher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockVideoSearcher {
    results: HashMap<String, Vec<Candidate>>,
    calls: Mutex<Vec<String>>,
}

impl MockVideoSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(mut self, query: &str, results: Vec<Candidate>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl VideoSearcher for MockVideoSearcher {
    async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
        _published_after: DateTime<Utc>,
    ) -> Result<Vec<Candidate>> {
        self.calls.lock().expect("lock").push(query.to_string());
        let mut results = self
            .results
            .get(query)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("MockVideoSearcher: no results registered for {query}"))?;
        results.truncate(max_results);
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// MockPostSearcher
// ---------------------------------------------------------------------------

pub struct MockPostSearcher {
    name: &'static str,
    results: HashMap<String, Vec<Candidate>>,
    calls: Mutex<Vec<String>>,
}

impl MockPostSearcher {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            results: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_query(mut self, query: &str, results: Vec<Candidate>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl PostSearcher for MockPostSearcher {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search_posts(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>> {
        self.calls.lock().expect("lock").push(query.to_string());
        let mut results = self.results.get(query).cloned().unwrap_or_default();
        results.truncate(max_results);
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// MockEngagement
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockEngagement {
    counts: HashMap<String, Engagement>,
}

impl MockEngagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_url(mut self, url: &str, engagement: Engagement) -> Self {
        self.counts.insert(url.to_string(), engagement);
        self
    }
}

#[async_trait]
impl EngagementFetcher for MockEngagement {
    async fn engagement(&self, url: &str) -> Engagement {
        self.counts.get(url).copied().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockClassifier {
    verdicts: HashMap<String, Classification>,
    calls: Mutex<Vec<String>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_url(mut self, url: &str, classification: Classification) -> Self {
        self.verdicts.insert(url.to_string(), classification);
        self
    }

    /// URLs classified so far, in call order.
    pub fn classified(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, candidate: &Candidate) -> Classification {
        self.calls.lock().expect("lock").push(candidate.url.clone());
        self.verdicts
            .get(&candidate.url)
            .cloned()
            .unwrap_or_else(|| Classification::fallback(candidate))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn video(id: &str, title: &str, views: u64) -> Candidate {
    Candidate {
        title: title.to_string(),
        description: format!("{title} description"),
        url: format!("https://www.youtube.com/watch?v={id}"),
        thumbnail: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
        creator: "Test Channel".to_string(),
        creator_url: "https://www.youtube.com/channel/UCtest".to_string(),
        platform: Platform::YouTube,
        published_at: "2025-01-01T00:00:00Z".to_string(),
        engagement: Engagement::new(views, views / 20, views / 100),
    }
}

pub fn post(slug: &str, title: &str) -> Candidate {
    Candidate {
        title: title.to_string(),
        description: format!("{title} description"),
        url: format!("https://www.linkedin.com/posts/{slug}"),
        creator: "Unknown".to_string(),
        platform: Platform::LinkedIn,
        published_at: "2025-01-01T00:00:00Z".to_string(),
        ..Default::default()
    }
}

/// A classification that passes the standard gate.
pub fn accepted(score: u8, project: &str) -> Classification {
    Classification {
        relevance_score: score,
        ai_tools_used: vec!["Cursor".to_string()],
        category_tags: vec!["Code Generation".to_string()],
        is_no_code_low_code: true,
        is_real_project: true,
        project_name: project.to_string(),
        project_summary: format!("{project} for testers"),
        project_evidence: format!("built {project} on camera"),
        enhanced_description: format!("{project}, described."),
        build_complexity: showcase_common::BuildComplexity::LowCode,
    }
}

/// A classification that fails the standard gate on relevance.
pub fn rejected() -> Classification {
    Classification {
        relevance_score: 3,
        ..Default::default()
    }
}
