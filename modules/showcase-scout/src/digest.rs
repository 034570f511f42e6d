//! HTML review digest: one card per record with approve / skip mail links.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use showcase_common::{html_escape, ExampleRecord};

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
    .header { background: #003c72; color: white; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
    .example { border: 1px solid #ddd; border-radius: 8px; padding: 20px; margin-bottom: 20px; }
    .example img { max-width: 100%; border-radius: 4px; border: 1px solid #cdd7f3; }
    .score { background: #4CAF50; color: white; padding: 4px 12px; border-radius: 12px; font-size: 12px; }
    .tools { display: flex; flex-wrap: wrap; gap: 8px; margin: 10px 0; }
    .tool-tag { background: #ebf1ff; color: #003c72; padding: 4px 12px; border-radius: 12px; font-size: 12px; }
    .buttons { margin-top: 15px; }
    .btn { display: inline-block; padding: 10px 20px; margin-right: 10px; text-decoration: none; border-radius: 4px; }
    .btn-approve { background: #4CAF50; color: white; }
    .btn-reject { background: #f44336; color: white; }
    .evidence { background: #f7fbff; border-left: 4px solid #2563eb; padding: 12px 16px; margin: 15px 0; line-height: 1.6; }
    .artifact { margin: 15px 0; }
    .artifact-label { font-weight: bold; color: #0f172a; display: block; margin-bottom: 8px; }
    .artifact-warning { font-size: 12px; color: #6b7280; margin-top: 6px; }
    .artifact-meta { margin: 12px 0; padding: 10px 14px; background: #eef2ff; border-radius: 8px; }
    .artifact-meta strong { color: #1e3a8a; }
"#;

pub fn digest_file_name(date: NaiveDate) -> String {
    format!("email_digest_{}.html", date.format("%Y%m%d"))
}

pub fn render_digest(records: &[ExampleRecord], email_to: &str, date: NaiveDate) -> String {
    if records.is_empty() {
        return "<p>No new AI examples found today.</p>".to_string();
    }

    let cards: String = records
        .iter()
        .enumerate()
        .map(|(i, r)| render_card(i, r, email_to))
        .collect();

    format!(
        r#"<html>
<head>
<meta charset="utf-8">
<style>{STYLE}</style>
</head>
<body>
    <div class="header">
        <h1>Daily AI Examples Digest</h1>
        <p>Found {count} new projects on {date}</p>
    </div>
{cards}
</body>
</html>
"#,
        count = records.len(),
        date = date.format("%Y-%m-%d"),
    )
}

fn render_card(index: usize, r: &ExampleRecord, email_to: &str) -> String {
    let project_name = or_placeholder(&r.project_name, "Unnamed project");
    let project_summary = or_placeholder(&r.project_summary, "No summary yet");

    let screenshot = if r.thumbnail_url.is_empty() {
        "<p><em>No screenshot provided. Add one showing the finished artifact.</em></p>".to_string()
    } else {
        format!(
            r#"<div class="artifact"><span class="artifact-label">Project screenshot (must show the real result)</span><img src="{src}" alt="artifact thumbnail"><div class="artifact-warning">Check that the thumbnail shows the actual output or demo.</div></div>"#,
            src = html_escape(&r.thumbnail_url),
        )
    };

    let evidence = if r.project_evidence.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="evidence"><strong>What was built:</strong> {}</div>"#,
            html_escape(&r.project_evidence)
        )
    };

    let tags = |items: &[String]| -> String {
        items
            .iter()
            .map(|t| format!(r#"<span class="tool-tag">{}</span>"#, html_escape(t)))
            .collect::<Vec<_>>()
            .join(" ")
    };

    format!(
        r#"
    <div class="example">
        <h2>{title}</h2>
        <span class="score">Relevance: {score}/10</span>
        <span class="score">{complexity}</span>
        <div class="artifact-meta">
            <p><strong>Artifact:</strong> {project_name}</p>
            <p><strong>Purpose:</strong> {project_summary}</p>
        </div>
        {screenshot}
        <p>{description}</p>
        {evidence}
        <div class="tools"><strong>AI Tools:</strong> {tools}</div>
        <div class="tools"><strong>Categories:</strong> {categories}</div>
        <p><strong>Creator:</strong> <a href="{creator_link}">{creator_name}</a></p>
        <p><strong>Platform:</strong> {platform}</p>
        <p><strong>URL:</strong> <a href="{url}">{url}</a></p>
        <div class="buttons">
            <a href="mailto:{email}?subject=APPROVE:{index}&amp;body=Approved" class="btn btn-approve">Approve &amp; Add</a>
            <a href="mailto:{email}?subject=REJECT:{index}&amp;body=Rejected" class="btn btn-reject">Skip</a>
        </div>
    </div>
"#,
        title = html_escape(&r.title),
        score = r.relevance_score,
        complexity = r.build_complexity,
        project_name = html_escape(project_name),
        project_summary = html_escape(project_summary),
        description = html_escape(&r.description),
        tools = tags(&r.ai_tools_used),
        categories = tags(&r.category_tags),
        creator_link = html_escape(&r.creator_link),
        creator_name = html_escape(&r.creator_name),
        platform = r.source_platform,
        url = html_escape(&r.original_url),
        email = html_escape(email_to),
    )
}

/// Write the digest next to the snapshot and return its path.
pub fn write_digest(dir: &Path, html: &str, date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(digest_file_name(date));
    fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Digest written");
    Ok(path)
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}
