use serde::{Deserialize, Serialize};

// =============================================================================
// Content
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

// =============================================================================
// Generation Config
// =============================================================================

/// Sampling settings sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
            response_mime_type: Some("application/json".to_string()),
        }
    }
}

// =============================================================================
// Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            contents: Vec::new(),
            system_instruction: None,
            generation_config: config,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::system(system));
        self
    }

    pub fn user_parts(mut self, parts: impl IntoIterator<Item = String>) -> Self {
        let parts = parts.into_iter().map(Part::text).collect();
        self.contents.push(Content::user(parts));
        self
    }
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Reason the prompt or a candidate was withheld, if any.
    pub fn block_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(reason);
        }
        self.candidates
            .iter()
            .filter_map(|c| c.finish_reason.as_deref())
            .find(|r| matches!(*r, "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT"))
            .map(str::to_string)
    }

    /// All text parts of all candidates, concatenated and trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for candidate in &self.candidates {
            if let Some(content) = &candidate.content {
                for part in &content.parts {
                    if let Some(text) = &part.text {
                        out.push_str(text);
                    }
                }
            }
        }
        out.trim().to_string()
    }
}

// =============================================================================
// Error Envelope
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateRequest::new(GenerationConfig::default())
            .system("be terse")
            .user_parts(vec!["hello".to_string()]);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(value["contents"][0]["role"], "user");
    }

    #[test]
    fn response_text_joins_parts() {
        let json = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                "finishReason": "STOP"
            }]
        });
        let response: GenerateResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.text(), "{\"a\":1}");
        assert!(response.block_reason().is_none());
    }

    #[test]
    fn safety_finish_is_a_block() {
        let json = serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        });
        let response: GenerateResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.block_reason().as_deref(), Some("SAFETY"));
        assert_eq!(response.text(), "");
    }
}
