use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
const PLACEHOLDER: &str = "YOUR_KEY_HERE";

/// Application configuration loaded from environment variables.
///
/// Every integration key is optional. A missing key turns the matching
/// source off instead of stopping the run.
#[derive(Debug, Clone)]
pub struct Config {
    // Discovery sources
    pub youtube_api_key: Option<String>,
    pub serpapi_key: Option<String>,
    pub linkedin_access_token: Option<String>,

    // Classifier
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,

    // Digest
    pub email_to: Option<String>,

    // Snapshot location
    pub data_dir: PathBuf,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    /// Set when a hosting platform injects `PORT`; the server then binds all interfaces.
    pub platform_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` is this over the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |name: &str| lookup(name).and_then(usable);

        Self {
            youtube_api_key: key("YOUTUBE_API_KEY"),
            serpapi_key: key("SERPAPI_KEY"),
            linkedin_access_token: key("LINKEDIN_ACCESS_TOKEN"),
            gemini_api_key: key("GEMINI_API_KEY"),
            gemini_model: key("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            email_to: key("EMAIL_TO"),
            data_dir: key("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            web_host: key("WEB_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            web_port: parse_port("WEB_PORT", key("WEB_PORT")).unwrap_or(5001),
            platform_port: parse_port("PORT", key("PORT")),
        }
    }

    /// Address the web view should bind to.
    pub fn bind_addr(&self) -> String {
        match self.platform_port {
            Some(port) => format!("0.0.0.0:{port}"),
            None => format!("{}:{}", self.web_host, self.web_port),
        }
    }

    pub fn has_youtube(&self) -> bool {
        self.youtube_api_key.is_some()
    }

    pub fn has_serpapi(&self) -> bool {
        self.serpapi_key.is_some()
    }

    pub fn has_linkedin(&self) -> bool {
        self.linkedin_access_token.is_some()
    }

    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// Log which integrations are configured without printing any secret.
    pub fn log_redacted(&self) {
        info!(
            youtube = self.has_youtube(),
            serpapi = self.has_serpapi(),
            linkedin = self.has_linkedin(),
            gemini = self.has_gemini(),
            gemini_model = self.gemini_model.as_str(),
            email_to = self.email_to.is_some(),
            data_dir = %self.data_dir.display(),
            "Configuration loaded"
        );
    }
}

fn usable(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_port(name: &str, raw: Option<String>) -> Option<u16> {
    let raw = raw?;
    match raw.parse() {
        Ok(port) => Some(port),
        Err(_) => {
            warn!(var = name, value = raw.as_str(), "Ignoring non-numeric port");
            None
        }
    }
}
