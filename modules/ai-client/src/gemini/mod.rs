mod client;
pub(crate) mod types;

use tracing::debug;

use crate::error::{AiError, Result};
use crate::schema::StructuredOutput;
use crate::util::strip_code_blocks;
use client::GeminiClient;
use types::*;

// =============================================================================
// Gemini Model Handle
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    config: GenerationConfig,
    base_url: Option<String>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            config: GenerationConfig::default(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Same credentials, different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Send a system instruction plus user parts; return the concatenated text.
    pub async fn generate(
        &self,
        system: Option<&str>,
        parts: impl IntoIterator<Item = String>,
    ) -> Result<String> {
        let mut request = GenerateRequest::new(self.config.clone()).user_parts(parts);
        if let Some(system) = system {
            request = request.system(system);
        }

        let response = self.client().generate(&self.model, &request).await?;

        if let Some(reason) = response.block_reason() {
            return Err(AiError::Blocked(reason));
        }

        let text = response.text();
        if text.is_empty() {
            return Err(AiError::Empty);
        }
        Ok(text)
    }

    /// Ask for JSON matching `T`. The schema derived from `T` is sent as a
    /// trailing `expected_schema` part.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system: &str,
        user_parts: Vec<String>,
    ) -> Result<T> {
        let mut parts = user_parts;
        parts.push(serde_json::json!({ "expected_schema": T::gemini_schema() }).to_string());

        let text = self.generate(Some(system), parts).await?;
        debug!(model = %self.model, bytes = text.len(), "Gemini structured response");

        serde_json::from_str(strip_code_blocks(&text))
            .map_err(|e| AiError::Parse(format!("Failed to deserialize {}: {e}", T::type_name())))
    }

    /// Cheap request used to confirm the model name is served for this key.
    pub async fn ping(&self) -> Result<()> {
        self.generate(None, ["test".to_string()]).await.map(|_| ())
    }
}
