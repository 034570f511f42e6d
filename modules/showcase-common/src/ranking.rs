//! Ordering and deduplication over example records.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::ExampleRecord;

/// Maximum number of records the web view shows.
pub const DISPLAY_LIMIT: usize = 40;

/// Drop records whose `original_url` was already seen. First occurrence wins.
pub fn dedup_by_url(records: Vec<ExampleRecord>) -> Vec<ExampleRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.original_url.clone()))
        .collect()
}

/// Order produced by a crawl: most viewed first, ties broken by relevance.
pub fn crawl_order(records: &mut [ExampleRecord]) {
    records.sort_by(|a, b| by_views_then_relevance(a, b));
}

/// Order shown to readers: YouTube first (views, then relevance), then every
/// other platform by relevance. The sort is stable, so equal records keep
/// their snapshot order.
pub fn display_order(records: &mut [ExampleRecord]) {
    records.sort_by(|a, b| match (a.is_youtube(), b.is_youtube()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => by_views_then_relevance(a, b),
        (false, false) => b.relevance_score.cmp(&a.relevance_score),
    });
}

fn by_views_then_relevance(a: &ExampleRecord, b: &ExampleRecord) -> Ordering {
    b.engagement
        .view_count
        .cmp(&a.engagement.view_count)
        .then_with(|| b.relevance_score.cmp(&a.relevance_score))
}
