//! Keyword sets and pacing for each kind of crawl.

use std::str::FromStr;
use std::time::Duration;

/// Tools the classifier is told to look for.
pub const TARGET_TOOLS: &[&str] = &[
    "Cursor",
    "Claude",
    "ChatGPT",
    "Gemini",
    "GitHub Copilot",
    "v0",
    "Lovable",
    "Replit",
    "Bolt.new",
    "Make.com",
    "n8n",
    "Zapier",
    "Bubble",
    "Figma",
    "Framer",
    "Webflow",
    "Airtable",
    "Notion AI",
    "Midjourney",
    "DALL-E",
    "Stable Diffusion",
    "RunwayML",
    "ElevenLabs",
    "Suno",
    "Udio",
];

/// Category tags the classifier may choose from.
pub const CATEGORY_TAGS: &[&str] = &[
    "Computer Vision",
    "NLP",
    "Generative AI",
    "Machine Learning",
    "Automation",
    "Content Creation",
    "Code Generation",
    "Design",
    "Audio/Music",
    "Video",
    "Data Analysis",
    "Chatbot",
    "Agent",
];

const GENERAL_VIDEO_KEYWORDS: &[&str] = &[
    "built with Cursor AI",
    "Lovable AI project",
    "v0 by Vercel project",
    "built with Claude",
    "made with ChatGPT",
    "made with Gemini",
    "n8n AI automation",
    "Make.com AI workflow",
    "Replit AI app",
    "Bolt.new project",
    "no-code AI project",
    "AI project showcase",
    "built AI product weekend",
];

// Only the first three are searched per run to stay inside the SerpAPI quota.
const GENERAL_POST_KEYWORDS: &[&str] = &[
    "built with Cursor",
    "Lovable project",
    "v0 by Vercel",
    "AI coding project",
    "no-code AI",
    "vibe coding",
];

const DESIGN_VIDEO_KEYWORDS: &[&str] = &[
    "cursor design system",
    "cursor UI components",
    "cursor build UI",
    "cursor web design",
    "cursor figma plugin",
    "figma make design",
    "figma mcp plugin",
    "figma make icon",
    "vibe coding design",
    "vibe coding UI",
    "built with cursor design",
    "cursor build website",
    "cursor create design",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileName {
    General,
    Design,
    LinkedIn,
}

impl FromStr for ProfileName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(ProfileName::General),
            "design" => Ok(ProfileName::Design),
            "linkedin" => Ok(ProfileName::LinkedIn),
            other => Err(format!(
                "unknown profile '{other}' (expected general, design or linkedin)"
            )),
        }
    }
}

impl std::fmt::Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileName::General => write!(f, "general"),
            ProfileName::Design => write!(f, "design"),
            ProfileName::LinkedIn => write!(f, "linkedin"),
        }
    }
}

/// Everything a crawl run needs to know besides its collaborators.
#[derive(Debug, Clone)]
pub struct CrawlProfile {
    pub name: ProfileName,
    pub video_keywords: Vec<String>,
    pub video_window_days: i64,
    pub video_results_per_keyword: usize,
    pub post_keywords: Vec<String>,
    pub post_results_per_keyword: usize,
    /// Pause between consecutive keyword searches.
    pub search_delay: Duration,
    /// Cap on how many candidates reach the classifier.
    pub max_candidates: Option<usize>,
    /// Pause between consecutive classifier calls.
    pub classify_delay: Duration,
    pub target: usize,
    /// Merge into the existing snapshot instead of replacing it.
    pub merge_existing: bool,
    /// Most records kept in a merged snapshot.
    pub merge_cap: Option<usize>,
    pub primary_category: Option<String>,
    /// Apply the design heuristics before the standard acceptance gate.
    pub design_criteria: bool,
}

impl CrawlProfile {
    pub fn for_name(name: ProfileName) -> Self {
        match name {
            ProfileName::General => Self::general(),
            ProfileName::Design => Self::design(),
            ProfileName::LinkedIn => Self::linkedin(),
        }
    }

    pub fn general() -> Self {
        Self {
            name: ProfileName::General,
            video_keywords: owned(GENERAL_VIDEO_KEYWORDS),
            video_window_days: 30,
            video_results_per_keyword: 10,
            post_keywords: owned(&GENERAL_POST_KEYWORDS[..3]),
            post_results_per_keyword: 5,
            search_delay: Duration::ZERO,
            max_candidates: None,
            classify_delay: Duration::ZERO,
            target: 30,
            merge_existing: false,
            merge_cap: None,
            primary_category: None,
            design_criteria: false,
        }
    }

    pub fn design() -> Self {
        Self {
            name: ProfileName::Design,
            video_keywords: owned(DESIGN_VIDEO_KEYWORDS),
            video_window_days: 180,
            video_results_per_keyword: 10,
            post_keywords: Vec::new(),
            post_results_per_keyword: 0,
            search_delay: Duration::from_secs(2),
            max_candidates: Some(50),
            // The free Gemini tier allows roughly ten requests a minute.
            classify_delay: Duration::from_secs(7),
            target: 15,
            merge_existing: true,
            merge_cap: None,
            primary_category: Some("Design".to_string()),
            design_criteria: true,
        }
    }

    /// Posts only, merged into the existing snapshot. Pairs with the keyword
    /// classifier when the model is out of quota.
    pub fn linkedin() -> Self {
        Self {
            name: ProfileName::LinkedIn,
            video_keywords: Vec::new(),
            video_window_days: 30,
            video_results_per_keyword: 0,
            post_keywords: owned(&GENERAL_POST_KEYWORDS[..3]),
            post_results_per_keyword: 5,
            search_delay: Duration::ZERO,
            max_candidates: Some(10),
            classify_delay: Duration::ZERO,
            target: 10,
            merge_existing: true,
            merge_cap: Some(30),
            primary_category: None,
            design_criteria: false,
        }
    }

    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    /// Drop all pacing. Used by tests and dry runs against mocks.
    pub fn without_delays(mut self) -> Self {
        self.search_delay = Duration::ZERO;
        self.classify_delay = Duration::ZERO;
        self
    }
}

fn owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}
