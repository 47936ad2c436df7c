// Gemini LLM driver
//
// Production implementation of the LanguageModel trait over the Gemini
// generateContent REST API. Prior turns are converted to Gemini's
// conversation format; the prompt becomes the final user turn.

use async_trait::async_trait;
use reqwest::Client;

use solace_core::{
    ChatError, GenerateOptions, LanguageModel, Message, MessageRole, Result,
};

use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when GEMINI_MODEL is not set
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini driver
///
/// # Example
///
/// ```ignore
/// use solace_gemini::GeminiClient;
///
/// let client = GeminiClient::from_env()?;
/// // or
/// let client = GeminiClient::new("your-api-key", "gemini-1.5-flash");
/// ```
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new driver with the given API key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a new driver from GEMINI_API_KEY / GEMINI_MODEL.
    ///
    /// A missing key is a configuration error, surfaced at startup rather
    /// than per request.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ChatError::config("GEMINI_API_KEY environment variable not set"))?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Override the API base URL (for tests and proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the configured model id
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn convert_history(history: &[Message]) -> Vec<Content> {
        history
            .iter()
            .map(|message| Content {
                role: match message.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                }
                .to_string(),
                parts: vec![Part {
                    text: message.content.clone(),
                }],
            })
            .collect()
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        history: &[Message],
        options: &GenerateOptions,
    ) -> Result<String> {
        let mut contents = Self::convert_history(history);
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        });

        let generation_config = if options.temperature.is_some()
            || options.max_output_tokens.is_some()
        {
            Some(GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
            })
        } else {
            None
        };

        let request = GenerateContentRequest {
            contents,
            generation_config,
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::model(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "gemini call failed");
            return Err(ChatError::model(format!("API returned {status}: {body}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ChatError::model(format!("invalid response body: {e}")))?;

        parsed
            .text()
            .ok_or_else(|| ChatError::model("response contained no candidates"))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
