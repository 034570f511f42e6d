use std::collections::BTreeSet;

use showcase_common::{html_escape, ExampleRecord};

/// Category shown for records the crawler did not tag.
const DEFAULT_CATEGORY: &str = "Development";

/// Render the example grid with tool and category filters.
pub fn render_index(examples: &[ExampleRecord]) -> String {
    let tools: BTreeSet<&str> = examples
        .iter()
        .flat_map(|e| e.ai_tools_used.iter().map(String::as_str))
        .collect();
    let categories: BTreeSet<&str> = examples.iter().map(category_of).collect();

    let mut cards = String::new();
    if examples.is_empty() {
        cards.push_str(r#"<p class="empty">No examples yet. Run <code>scout crawl</code> to populate the snapshot.</p>"#);
    }
    for (id, example) in examples.iter().enumerate() {
        cards.push_str(&render_card(id, example));
    }

    let content = format!(
        r#"<div class="container">
<div class="filters">
    <div class="filter-row"><span class="filter-label">Tools</span>{tool_buttons}</div>
    <div class="filter-row"><span class="filter-label">Category</span>{category_buttons}</div>
</div>
<p class="count">{count} examples</p>
<div class="grid">{cards}</div>
</div>
<script>
let active = {{ tool: null, category: null }};
document.querySelectorAll('.filter-btn').forEach(btn => {{
    btn.addEventListener('click', () => {{
        const kind = btn.dataset.kind;
        active[kind] = active[kind] === btn.dataset.value ? null : btn.dataset.value;
        document.querySelectorAll(`.filter-btn[data-kind="${{kind}}"]`).forEach(b =>
            b.classList.toggle('active', b.dataset.value === active[kind]));
        document.querySelectorAll('.example-card').forEach(card => {{
            const tools = card.dataset.tools.split('|');
            const ok = (!active.tool || tools.includes(active.tool))
                && (!active.category || card.dataset.category === active.category);
            card.style.display = ok ? '' : 'none';
        }});
    }});
}});
</script>"#,
        tool_buttons = filter_buttons("tool", &tools),
        category_buttons = filter_buttons("category", &categories),
        count = examples.len(),
    );

    build_page("Examples", &content)
}

fn render_card(id: usize, e: &ExampleRecord) -> String {
    let thumbnail = if e.thumbnail_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img class="thumb" src="{}" alt="" loading="lazy">"#,
            html_escape(&e.thumbnail_url)
        )
    };

    let creator = if e.creator_link.is_empty() {
        html_escape(&e.creator_name)
    } else {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(&e.creator_link),
            html_escape(&e.creator_name)
        )
    };

    let project = if e.project_name.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="project"><strong>{}</strong> {}</p>"#,
            html_escape(&e.project_name),
            html_escape(&e.project_summary)
        )
    };

    let tags: String = e
        .ai_tools_used
        .iter()
        .map(|t| format!(r#"<span class="tag tag-tool">{}</span>"#, html_escape(t)))
        .chain(
            e.category_tags
                .iter()
                .map(|t| format!(r#"<span class="tag">{}</span>"#, html_escape(t))),
        )
        .collect();

    format!(
        r#"<div class="example-card" id="example-{id}" data-tools="{tools}" data-category="{category}">
    {thumbnail}
    <div class="body">
        <div><span class="badge">{platform}</span><span class="complexity">{complexity}</span></div>
        <h3><a href="{url}" target="_blank" rel="noopener">{title}</a></h3>
        {project}
        <p class="summary">{description}</p>
        <div class="tags">{tags}</div>
        <div class="meta-row"><span>{creator}</span><span>{views} views</span><span>{likes} likes</span><span>{comments} comments</span><span>Score {score}/10</span></div>
    </div>
</div>"#,
        tools = html_escape(&e.ai_tools_used.join("|")),
        category = html_escape(category_of(e)),
        platform = html_escape(e.source_platform.as_str()),
        complexity = e.build_complexity,
        url = html_escape(&e.original_url),
        title = html_escape(&e.title),
        description = html_escape(&e.description),
        views = format_number(e.engagement.view_count),
        likes = format_number(e.engagement.like_count),
        comments = format_number(e.engagement.comment_count),
        score = e.relevance_score,
    )
}

fn filter_buttons(kind: &str, values: &BTreeSet<&str>) -> String {
    values
        .iter()
        .map(|v| {
            let v = html_escape(v);
            format!(r#"<button class="filter-btn" data-kind="{kind}" data-value="{v}">{v}</button>"#)
        })
        .collect()
}

fn category_of(e: &ExampleRecord) -> &str {
    match e.primary_category.as_deref() {
        Some(c) if !c.is_empty() => c,
        _ => DEFAULT_CATEGORY,
    }
}

// --- Helpers ---

/// `1234567` → `1.2M`, `3400` → `3.4K`.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | AI Examples Showcase</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;display:flex;align-items:center;justify-content:space-between;}}
.header h1{{font-size:18px;font-weight:600;}}
.header nav a{{color:#ccc;text-decoration:none;margin-left:20px;font-size:14px;}}
.header nav a:hover{{color:#fff;}}
.container{{max-width:1200px;margin:0 auto;padding:24px;}}
.filters{{margin-bottom:16px;}}
.filter-row{{display:flex;flex-wrap:wrap;gap:6px;align-items:center;margin-bottom:8px;}}
.filter-label{{font-size:12px;color:#888;width:72px;}}
.filter-btn{{border:1px solid #ddd;background:#fff;border-radius:12px;padding:2px 10px;font-size:12px;cursor:pointer;}}
.filter-btn.active{{background:#1a1a1a;color:#fff;border-color:#1a1a1a;}}
.count{{font-size:13px;color:#888;margin-bottom:12px;}}
.grid{{display:grid;grid-template-columns:repeat(auto-fill,minmax(320px,1fr));gap:16px;}}
.example-card{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;overflow:hidden;}}
.example-card:hover{{border-color:#999;}}
.example-card .thumb{{width:100%;aspect-ratio:16/9;object-fit:cover;display:block;}}
.example-card .body{{padding:16px;}}
.example-card h3{{font-size:16px;margin:6px 0 4px;}}
.example-card h3 a{{color:#1a1a1a;text-decoration:none;}}
.example-card h3 a:hover{{color:#0066cc;}}
.project{{font-size:13px;color:#333;margin-bottom:6px;}}
.summary{{color:#555;font-size:14px;margin-bottom:8px;}}
.badge{{display:inline-block;padding:2px 8px;border-radius:12px;font-size:11px;font-weight:600;text-transform:uppercase;background:#e3f2fd;color:#1565c0;}}
.complexity{{font-size:11px;color:#795548;margin-left:8px;}}
.tags{{display:flex;gap:6px;flex-wrap:wrap;}}
.tag{{background:#f0f0f0;padding:2px 8px;border-radius:10px;font-size:11px;color:#555;}}
.tag-tool{{background:#e8f5e9;color:#2e7d32;}}
.meta-row{{display:flex;flex-wrap:wrap;gap:12px;align-items:center;font-size:12px;color:#888;margin-top:8px;}}
.meta-row a{{color:#0066cc;text-decoration:none;}}
.empty{{color:#888;text-align:center;padding:40px;}}
</style>
</head>
<body>
<div class="header">
    <h1>AI Examples Showcase</h1>
    <nav><a href="/">Examples</a><a href="/api/examples">JSON</a></nav>
</div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}
