// Trait seams for the crawl pipeline.
//
// VideoSearcher and PostSearcher stand in front of the platform APIs,
// EngagementFetcher in front of the LinkedIn page scrape, Classifier in front
// of the language model. Each has an in-memory mock in `testing`, so the
// pipeline runs in tests with no network.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use showcase_common::{Candidate, Engagement};

use crate::classifier::Classification;

// ---------------------------------------------------------------------------
// Searchers
// ---------------------------------------------------------------------------

#[async_trait]
pub trait VideoSearcher: Send + Sync {
    /// Videos matching `query` published after `published_after`, most viewed first.
    async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<Candidate>>;
}

#[async_trait]
pub trait PostSearcher: Send + Sync {
    /// Short label used in logs ("serpapi", "linkedin-api").
    fn name(&self) -> &'static str;

    async fn search_posts(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>>;
}

/// Searcher used when a source has no credentials. Always empty.
pub struct NoopSearcher {
    pub source: &'static str,
}

#[async_trait]
impl VideoSearcher for NoopSearcher {
    async fn search_videos(
        &self,
        query: &str,
        _max_results: usize,
        _published_after: DateTime<Utc>,
    ) -> Result<Vec<Candidate>> {
        debug!(source = self.source, query, "Search skipped, source not configured");
        Ok(Vec::new())
    }
}

#[async_trait]
impl PostSearcher for NoopSearcher {
    fn name(&self) -> &'static str {
        self.source
    }

    async fn search_posts(&self, query: &str, _max_results: usize) -> Result<Vec<Candidate>> {
        debug!(source = self.source, query, "Search skipped, source not configured");
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EngagementFetcher: Send + Sync {
    /// Best-effort counts for a post. Failures come back as zeros.
    async fn engagement(&self, url: &str) -> Engagement;
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Score and describe a candidate. Never fails: an unusable model answer
    /// becomes a zero-score classification.
    async fn classify(&self, candidate: &Candidate) -> Classification;
}
