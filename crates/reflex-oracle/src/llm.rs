//! LLM backend abstraction and implementations.
//!
//! Defines an enum-based dispatch for LLM backends, avoiding the
//! dyn-compatibility issues with async trait methods. Concrete
//! implementations exist for OpenAI-compatible APIs, the Anthropic
//! Messages API, and the Google Gemini API. All backends communicate
//! over HTTP via `reqwest`.
//!
//! The oracle does not care which model is behind the API -- it sends a
//! prompt and expects a text response containing JSON.

use crate::config::{BackendType, OracleConfig};
use crate::error::OracleError;
use crate::prompt::RenderedPrompt;

// ---------------------------------------------------------------------------
// Unified backend enum (dyn-compatible alternative to async trait)
// ---------------------------------------------------------------------------

/// An LLM backend that can process a prompt and return a response.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
    /// Google Gemini `generateContent` API.
    Google(GoogleBackend),
}

impl LlmBackend {
    /// Send a prompt to the LLM and return the response text.
    ///
    /// Dispatches to the concrete backend implementation.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Backend`] if the HTTP call fails or the
    /// response cannot be extracted.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
            Self::Google(backend) => backend.complete(prompt).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
            Self::Google(_) => "google",
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Works with `OpenAI`, `DeepSeek`, and Ollama endpoints.
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Send a prompt and return the response text.
    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": 0.7,
            "max_tokens": 256,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Backend(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(OracleError::Backend(format!(
                "OpenAI returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::Backend(format!("OpenAI response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, OracleError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            OracleError::Backend("OpenAI response missing choices[0].message.content".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Anthropic uses a different request format from `OpenAI`:
/// - Uses `x-api-key` header instead of `Authorization: Bearer`
/// - System is a top-level field, not part of the messages array
/// - Response structure differs: `content[0].text`
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Send a prompt and return the response text.
    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleError> {
        let url = format!("{}/messages", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 256,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Backend(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(OracleError::Backend(format!(
                "Anthropic returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::Backend(format!("Anthropic response parse failed: {e}")))?;

        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, OracleError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            OracleError::Backend("Anthropic response missing content[0].text".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Google Gemini backend
// ---------------------------------------------------------------------------

/// Backend for the Google Gemini `generateContent` API.
///
/// Gemini differs from both of the above:
/// - The model name is part of the URL, with the key as a query param
/// - System and user text travel as `contents` parts with a separate
///   `systemInstruction` field
/// - Response structure: `candidates[0].content.parts[0].text`
pub struct GoogleBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GoogleBackend {
    /// Create a new Gemini backend.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Send a prompt and return the response text.
    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "systemInstruction": {
                "parts": [{"text": prompt.system}]
            },
            "contents": [
                {"role": "user", "parts": [{"text": prompt.user}]}
            ],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 256
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Backend(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(OracleError::Backend(format!(
                "Gemini returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::Backend(format!("Gemini response parse failed: {e}")))?;

        extract_google_content(&json)
    }
}

/// Extract the text content from a Gemini `generateContent` response.
fn extract_google_content(json: &serde_json::Value) -> Result<String, OracleError> {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            OracleError::Backend(
                "Gemini response missing candidates[0].content.parts[0].text".to_owned(),
            )
        })
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create an LLM backend from configuration.
///
/// Dispatches on the configured [`BackendType`].
pub fn create_backend(config: &OracleConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
        BackendType::Google => LlmBackend::Google(GoogleBackend::new(config)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(backend_type: BackendType) -> OracleConfig {
        OracleConfig {
            backend_type,
            api_url: "https://example.invalid/v1".to_owned(),
            api_key: "test".to_owned(),
            model: "test-model".to_owned(),
            templates_dir: None,
        }
    }

    #[test]
    fn extract_openai_content_valid() {
        let json = serde_json::json!({
            "choices": [{
                "message": {"content": "{\"choice\": 2}"}
            }]
        });
        assert!(extract_openai_content(&json).unwrap().contains("choice"));
    }

    #[test]
    fn extract_openai_content_missing_choices() {
        let json = serde_json::json!({"error": "rate_limit"});
        assert!(extract_openai_content(&json).is_err());
    }

    #[test]
    fn extract_anthropic_content_valid() {
        let json = serde_json::json!({
            "content": [{"type": "text", "text": "{\"choice\": 0}"}]
        });
        assert!(extract_anthropic_content(&json).unwrap().contains('0'));
    }

    #[test]
    fn extract_anthropic_content_missing() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_content(&json).is_err());
    }

    #[test]
    fn extract_google_content_valid() {
        let json = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"choice\": 3}"}]}
            }]
        });
        assert!(extract_google_content(&json).unwrap().contains('3'));
    }

    #[test]
    fn extract_google_content_missing() {
        let json = serde_json::json!({"candidates": []});
        assert!(extract_google_content(&json).is_err());
    }

    #[test]
    fn create_backend_dispatches_correctly() {
        assert_eq!(
            create_backend(&config(BackendType::OpenAi)).name(),
            "openai-compatible"
        );
        assert_eq!(
            create_backend(&config(BackendType::Anthropic)).name(),
            "anthropic"
        );
        assert_eq!(create_backend(&config(BackendType::Google)).name(), "google");
    }
}
