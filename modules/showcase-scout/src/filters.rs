//! Keyword heuristics that decide which classified candidates become records.

use showcase_common::{Candidate, ExampleRecord};

use crate::classifier::Classification;

pub const MIN_RELEVANCE: u8 = 6;

/// Tools that mark a design post as vibe-coded.
const VIBE_TOOLS: &[&str] = &[
    "Cursor", "Figma", "Figma Make", "Figma MCP", "Claude", "ChatGPT", "Lovable", "v0",
];

const EVIDENCE_WORDS: &[&str] = &[
    "build", "create", "made", "generated", "developed", "constructed", "built a", "built an",
    "built the", "created a", "created an", "made a", "made an", "developed a", "developed an",
];

const TITLE_BUILD_WORDS: &[&str] = &[
    "build", "create", "made", "built with", "built a", "built an", "created", "made with",
    "using cursor", "using figma", "cursor build", "figma make", "figma mcp",
];

const MOUSE_CURSOR_PHRASES: &[&str] = &[
    "custom cursor", "mouse cursor", "cursor location", "cursor position", "cursor hover",
    "cursor enter", "cursor image", "cursor style", "change cursor", "cursor icon",
    "cursor design", "mouse enter", "based on cursor", "cursor-based", "cursor trigger",
];

const CURSOR_AI_PHRASES: &[&str] = &["cursor ai", "built with cursor", "using cursor"];

const FEATURE_DEMO_PHRASES: &[&str] = &[
    "new feature", "introducing", "announcement", "update", "what's new", "check out",
    "try this", "little experiment", "here's how", "how to use", "tutorial", "guide",
];

const DEMO_BUILD_WORDS: &[&str] = &[
    "built", "build", "created", "made", "generate", "generated", "built with", "built a",
    "made a", "created a",
];

const BUILD_WORDS: &[&str] = &[
    "built", "build", "created", "made", "generate", "generated", "built with", "built a",
    "made a", "created a", "built using", "made with", "created with", "built this", "made this",
];

const PRODUCT_WORDS: &[&str] = &[
    "app", "website", "plugin", "tool", "system", "library", "component", "dashboard",
    "interface", "prototype", "case study", "project", "product",
];

fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn is_placeholder(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("unknown") || s.eq_ignore_ascii_case("unspecified")
}

// --- Standard gate ---

/// Why a classification fails the standard gate, or `None` if it passes.
pub fn rejection(c: &Classification) -> Option<&'static str> {
    if c.relevance_score < MIN_RELEVANCE {
        Some("low relevance")
    } else if !c.is_real_project {
        Some("not a real project")
    } else if is_placeholder(&c.project_name) {
        Some("no project name")
    } else if is_placeholder(&c.project_summary) {
        Some("no project summary")
    } else {
        None
    }
}

// --- Design gate ---

/// A vibe-coding tool was used and something was demonstrably built, either
/// per the model or per the candidate's own title and description.
pub fn meets_design_criteria(candidate: &Candidate, c: &Classification) -> bool {
    let has_vibe_tool = c
        .ai_tools_used
        .iter()
        .any(|tool| VIBE_TOOLS.contains(&tool.as_str()));
    if !has_vibe_tool {
        return false;
    }

    let evidence = c.project_evidence.to_lowercase();
    let title_desc = format!("{} {}", candidate.title, candidate.description).to_lowercase();

    c.is_real_project
        || mentions_any(&evidence, EVIDENCE_WORDS)
        || mentions_any(&title_desc, TITLE_BUILD_WORDS)
}

// --- Snapshot cleanup ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FalsePositive {
    /// "cursor" meant the mouse pointer, not the editor.
    MouseCursor,
    FeatureDemoOnly,
    NoBuildEvidence,
    NoProductMention,
}

impl std::fmt::Display for FalsePositive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FalsePositive::MouseCursor => write!(f, "mouse cursor, not Cursor AI"),
            FalsePositive::FeatureDemoOnly => write!(f, "feature demo only"),
            FalsePositive::NoBuildEvidence => write!(f, "no build evidence"),
            FalsePositive::NoProductMention => write!(f, "no product mentioned"),
        }
    }
}

pub fn false_positive_reason(record: &ExampleRecord) -> Option<FalsePositive> {
    let text = record.search_text();

    if mentions_any(&text, MOUSE_CURSOR_PHRASES) && !mentions_any(&text, CURSOR_AI_PHRASES) {
        return Some(FalsePositive::MouseCursor);
    }
    if mentions_any(&text, FEATURE_DEMO_PHRASES) && !mentions_any(&text, DEMO_BUILD_WORDS) {
        return Some(FalsePositive::FeatureDemoOnly);
    }
    if !mentions_any(&text, BUILD_WORDS) {
        return Some(FalsePositive::NoBuildEvidence);
    }
    if !mentions_any(&text, PRODUCT_WORDS) {
        return Some(FalsePositive::NoProductMention);
    }
    None
}
