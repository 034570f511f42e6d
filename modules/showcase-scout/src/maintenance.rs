//! In-place passes over the latest snapshot.

use anyhow::{Context, Result};
use tracing::{info, warn};

use ai_client::truncate_chars;
use showcase_common::{Platform, SnapshotStore};

use crate::filters::{false_positive_reason, FalsePositive};
use crate::traits::EngagementFetcher;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngagementReport {
    pub linkedin: usize,
    /// Records that came back with at least one non-zero count.
    pub updated: usize,
}

/// Re-scrape counts for every LinkedIn record and rewrite the snapshot.
pub async fn refresh_engagement(
    store: &SnapshotStore,
    fetcher: &dyn EngagementFetcher,
) -> Result<EngagementReport> {
    let mut records = store.load().context("Failed to load snapshot")?;
    let mut report = EngagementReport::default();

    let total = records
        .iter()
        .filter(|r| r.source_platform == Platform::LinkedIn)
        .count();
    if total == 0 {
        warn!("No LinkedIn records in snapshot");
        return Ok(report);
    }
    report.linkedin = total;

    for record in records
        .iter_mut()
        .filter(|r| r.source_platform == Platform::LinkedIn && !r.original_url.is_empty())
    {
        let counts = fetcher.engagement(&record.original_url).await;
        record.engagement = counts;

        if counts.is_empty() {
            warn!(title = %truncate_chars(&record.title, 50), "No engagement found, post may need login or be deleted");
        } else {
            info!(
                title = %truncate_chars(&record.title, 50),
                views = counts.view_count,
                likes = counts.like_count,
                comments = counts.comment_count,
                "Engagement updated"
            );
            report.updated += 1;
        }
    }

    store.overwrite_latest(&records)?;
    info!(updated = report.updated, linkedin = report.linkedin, "Engagement refresh complete");
    Ok(report)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub kept: usize,
    pub removed: Vec<(String, FalsePositive)>,
}

/// Drop records the keyword heuristics flag as false positives.
pub fn clean_false_positives(store: &SnapshotStore) -> Result<CleanReport> {
    let records = store.load().context("Failed to load snapshot")?;
    if records.is_empty() {
        warn!("Snapshot is empty, nothing to clean");
        return Ok(CleanReport::default());
    }
    info!(count = records.len(), "Cleaning snapshot");

    let mut report = CleanReport::default();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        match false_positive_reason(&record) {
            Some(reason) => {
                info!(title = %truncate_chars(&record.title, 60), %reason, "Removed");
                report.removed.push((record.title, reason));
            }
            None => kept.push(record),
        }
    }

    report.kept = kept.len();
    store.overwrite_latest(&kept)?;
    info!(kept = report.kept, removed = report.removed.len(), "Clean complete");
    Ok(report)
}
