//! Configuration for the decision oracle, loaded from the environment.
//!
//! The oracle needs one backend: its type, base URL, API key, and model
//! name. Everything is read from `ORACLE_*` environment variables so a
//! deployment can switch providers without recompiling.

use crate::error::OracleError;

/// Configuration for the oracle's LLM backend.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// The backend type (openai, anthropic, google).
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Optional directory of prompt template overrides; compiled-in
    /// defaults are used when unset.
    pub templates_dir: Option<String>,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions API (works with `OpenAI`,
    /// `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Google Gemini `generateContent` API.
    Google,
}

impl OracleConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `ORACLE_BACKEND` -- backend type (`openai`, `anthropic`,
    ///   `google`)
    /// - `ORACLE_API_URL` -- API base URL
    /// - `ORACLE_API_KEY` -- API key
    /// - `ORACLE_MODEL` -- model name
    ///
    /// Optional variables:
    /// - `ORACLE_TEMPLATES_DIR` -- prompt template override directory
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] if a required variable is
    /// missing or the backend type is unknown.
    pub fn from_env() -> Result<Self, OracleError> {
        let backend_str = env_var("ORACLE_BACKEND")?;
        let api_url = env_var("ORACLE_API_URL")?;
        let api_key = env_var("ORACLE_API_KEY")?;
        let model = env_var("ORACLE_MODEL")?;
        let templates_dir = std::env::var("ORACLE_TEMPLATES_DIR").ok();

        Ok(Self {
            backend_type: parse_backend_type(&backend_str)?,
            api_url,
            api_key,
            model,
            templates_dir,
        })
    }
}

/// Read a required environment variable.
fn env_var(name: &str) -> Result<String, OracleError> {
    std::env::var(name)
        .map_err(|e| OracleError::Config(format!("missing required env var {name}: {e}")))
}

/// Map a backend name to its type.
fn parse_backend_type(s: &str) -> Result<BackendType, OracleError> {
    match s.to_lowercase().as_str() {
        "openai" | "deepseek" | "ollama" => Ok(BackendType::OpenAi),
        "anthropic" | "claude" => Ok(BackendType::Anthropic),
        "google" | "gemini" => Ok(BackendType::Google),
        other => Err(OracleError::Config(format!("unknown backend type: {other}"))),
    }
}
