//! LLM decision oracle for Reflex experiments.
//!
//! The oracle turns a serialized trial context into an opponent choice
//! by prompting an LLM over HTTP. It is strictly best-effort: on any
//! failure (network, provider error, unparseable output, out-of-range
//! choice) the caller substitutes [`Decision::fallback`], a uniform
//! random in-range choice. There is no retry.
//!
//! # Modules
//!
//! - [`config`] -- Backend configuration from `ORACLE_*` environment
//!   variables.
//! - [`error`] -- [`OracleError`].
//! - [`llm`] -- Enum-dispatched HTTP backends (OpenAI-compatible,
//!   Anthropic, Google Gemini).
//! - [`parse`] -- Multi-strategy extraction of `{choice, rationale}`
//!   from raw model text.
//! - [`prompt`] -- `minijinja` rendering with compiled-in default
//!   templates.
//!
//! [`OracleError`]: error::OracleError
//! [`Decision::fallback`]: parse::Decision::fallback

pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;

pub use config::{BackendType, OracleConfig};
pub use error::OracleError;
pub use parse::Decision;

use tracing::debug;

/// A configured oracle: one LLM backend plus the prompt engine.
pub struct Oracle {
    backend: llm::LlmBackend,
    prompts: prompt::PromptEngine,
}

impl Oracle {
    /// Build an oracle from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Template`] if a prompt template fails to
    /// compile.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        Ok(Self {
            backend: llm::create_backend(config),
            prompts: prompt::PromptEngine::new(config.templates_dir.as_deref())?,
        })
    }

    /// Build an oracle from `ORACLE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] for missing or invalid
    /// environment variables.
    pub fn from_env() -> Result<Self, OracleError> {
        Self::from_config(&OracleConfig::from_env()?)
    }

    /// Obtain one decision for a trial. `context` is the serialized
    /// trial state handed to the templates; `num_options` bounds the
    /// acceptable choice index.
    ///
    /// # Errors
    ///
    /// Returns any [`OracleError`]; the caller must substitute
    /// [`Decision::fallback`] rather than retrying.
    pub async fn decide(
        &self,
        context: &serde_json::Value,
        num_options: usize,
    ) -> Result<Decision, OracleError> {
        let rendered = self.prompts.render(context)?;
        let raw = self.backend.complete(&rendered).await?;
        let decision = parse::parse_decision(&raw, num_options)?;
        debug!(
            backend = self.backend.name(),
            choice = decision.choice,
            "oracle decision"
        );
        Ok(decision)
    }
}
