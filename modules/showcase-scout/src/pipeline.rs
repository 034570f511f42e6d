//! Crawl pipeline: search every keyword, dedup, classify the most viewed
//! candidates until the target is met, then persist.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use ai_client::truncate_chars;
use showcase_common::{
    crawl_order, dedup_by_url, display_order, Candidate, ExampleRecord, SnapshotStore,
};

use crate::classifier::Classification;
use crate::filters::{meets_design_criteria, rejection};
use crate::profiles::CrawlProfile;
use crate::traits::{Classifier, PostSearcher, VideoSearcher};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Unique candidates that reached the classifier queue.
    pub candidates: usize,
    pub classified: usize,
    pub accepted: usize,
    /// Records in the snapshot after this run.
    pub written: usize,
    /// Dated snapshot file, when one was written.
    pub path: Option<PathBuf>,
}

pub struct Crawler {
    videos: Arc<dyn VideoSearcher>,
    posts: Vec<Arc<dyn PostSearcher>>,
    classifier: Arc<dyn Classifier>,
    store: SnapshotStore,
}

impl Crawler {
    pub fn new(
        videos: Arc<dyn VideoSearcher>,
        classifier: Arc<dyn Classifier>,
        store: SnapshotStore,
    ) -> Self {
        Self {
            videos,
            posts: Vec::new(),
            classifier,
            store,
        }
    }

    /// Add a post source. Sources are tried in the order added; the first one
    /// returning results for a keyword wins.
    pub fn with_post_searcher(mut self, searcher: Arc<dyn PostSearcher>) -> Self {
        self.posts.push(searcher);
        self
    }

    pub async fn run(&self, profile: &CrawlProfile) -> Result<CrawlReport> {
        info!(profile = %profile.name, target = profile.target, "Starting crawl");

        let candidates = self.gather(profile).await;
        let (mut records, classified) = self.select(profile, &candidates).await;
        crawl_order(&mut records);

        let mut report = CrawlReport {
            candidates: candidates.len(),
            classified,
            accepted: records.len(),
            ..Default::default()
        };

        if profile.merge_existing {
            let existing = self.store.load().context("Failed to load existing snapshot")?;
            let merged = merge(existing, records, profile.merge_cap);
            self.store.overwrite_latest(&merged)?;
            report.written = merged.len();
        } else if records.is_empty() {
            info!("No examples found, snapshot left untouched");
        } else {
            report.path = Some(self.store.save(&records)?);
            report.written = records.len();
        }

        info!(
            candidates = report.candidates,
            classified = report.classified,
            accepted = report.accepted,
            written = report.written,
            "Crawl complete"
        );
        Ok(report)
    }

    /// Search every keyword, dedup by URL and rank by views. Search failures
    /// are logged and skipped.
    pub async fn gather(&self, profile: &CrawlProfile) -> Vec<Candidate> {
        let published_after = Utc::now() - chrono::Duration::days(profile.video_window_days);
        let mut raw = Vec::new();
        let mut searches = 0usize;

        for keyword in &profile.video_keywords {
            self.pace(profile, &mut searches).await;
            match self
                .videos
                .search_videos(keyword, profile.video_results_per_keyword, published_after)
                .await
            {
                Ok(results) => {
                    info!(keyword = keyword.as_str(), count = results.len(), "Video search");
                    raw.extend(results);
                }
                Err(e) => warn!(keyword = keyword.as_str(), error = %e, "Video search failed"),
            }
        }

        for keyword in &profile.post_keywords {
            self.pace(profile, &mut searches).await;
            for searcher in &self.posts {
                match searcher
                    .search_posts(keyword, profile.post_results_per_keyword)
                    .await
                {
                    Ok(results) if !results.is_empty() => {
                        info!(keyword = keyword.as_str(), source = searcher.name(), count = results.len(), "Post search");
                        raw.extend(results);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(keyword = keyword.as_str(), source = searcher.name(), error = %e, "Post search failed")
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        let mut unique: Vec<Candidate> = raw
            .into_iter()
            .filter(|c| seen.insert(c.url.clone()))
            .collect();
        unique.sort_by(|a, b| b.engagement.view_count.cmp(&a.engagement.view_count));
        if let Some(cap) = profile.max_candidates {
            unique.truncate(cap);
        }

        info!(count = unique.len(), "Unique candidates");
        unique
    }

    /// Classify candidates in order until `profile.target` records are found.
    /// Returns the records and how many classifier calls were made.
    pub async fn select(
        &self,
        profile: &CrawlProfile,
        candidates: &[Candidate],
    ) -> (Vec<ExampleRecord>, usize) {
        let now = Utc::now();
        let mut records = Vec::new();
        let mut classified = 0usize;

        for candidate in candidates {
            if records.len() >= profile.target {
                break;
            }
            if classified > 0 && !profile.classify_delay.is_zero() {
                tokio::time::sleep(profile.classify_delay).await;
            }

            let title = truncate_chars(&candidate.title, 60);
            let c = self.classifier.classify(candidate).await;
            classified += 1;

            // Design candidates that meet the design criteria are kept even
            // when they fail the standard gate, with the model's own values.
            let mut record = if profile.design_criteria {
                if !meets_design_criteria(candidate, &c) {
                    info!(title, tools = ?c.ai_tools_used, tags = ?c.category_tags, "Skipped: design criteria not met");
                    continue;
                }
                if let Some(reason) = rejection(&c) {
                    info!(title, score = c.relevance_score, reason, "Kept on design criteria despite standard gate");
                }
                build_record(candidate, &c, now)
            } else {
                match rejection(&c) {
                    None => build_record(candidate, &c, now),
                    Some(reason) => {
                        info!(title, score = c.relevance_score, reason, "Skipped");
                        continue;
                    }
                }
            };

            if let Some(category) = &profile.primary_category {
                record.primary_category = Some(category.clone());
            }
            info!(
                title,
                score = record.relevance_score,
                views = record.engagement.view_count,
                "Added"
            );
            records.push(record);
        }

        (records, classified)
    }

    async fn pace(&self, profile: &CrawlProfile, searches: &mut usize) {
        if *searches > 0 && !profile.search_delay.is_zero() {
            tokio::time::sleep(profile.search_delay).await;
        }
        *searches += 1;
    }
}

/// Existing records first, new ones after; one record per non-empty URL, in
/// display order, cut to `cap`.
fn merge(
    existing: Vec<ExampleRecord>,
    new: Vec<ExampleRecord>,
    cap: Option<usize>,
) -> Vec<ExampleRecord> {
    let combined: Vec<ExampleRecord> = existing
        .into_iter()
        .chain(new)
        .filter(|r| !r.original_url.is_empty())
        .collect();
    let mut merged = dedup_by_url(combined);
    display_order(&mut merged);
    if let Some(cap) = cap {
        merged.truncate(cap);
    }
    merged
}

pub fn build_record(
    candidate: &Candidate,
    c: &Classification,
    now: DateTime<Utc>,
) -> ExampleRecord {
    ExampleRecord {
        title: candidate.title.clone(),
        description: c.enhanced_description.clone(),
        ai_tools_used: c.ai_tools_used.clone(),
        category_tags: c.category_tags.clone(),
        source_platform: candidate.platform.clone(),
        original_url: candidate.url.clone(),
        creator_name: if candidate.creator.is_empty() {
            "Unknown".to_string()
        } else {
            candidate.creator.clone()
        },
        creator_link: candidate.creator_url.clone(),
        thumbnail_url: candidate.thumbnail.clone(),
        date_added: Some(now),
        relevance_score: c.relevance_score,
        build_complexity: c.build_complexity,
        is_no_code_low_code: c.is_no_code_low_code,
        project_name: c.project_name.clone(),
        project_summary: c.project_summary.clone(),
        project_evidence: c.project_evidence.clone(),
        engagement: candidate.engagement,
        primary_category: None,
    }
}
