//! Error types for the decision oracle.
//!
//! Uses `thiserror` for typed errors that surface through the oracle
//! pipeline: configuration, prompt rendering, backend calls, response
//! parsing. Every variant is recoverable by design: callers substitute
//! a uniform-random fallback decision instead of retrying.

/// Errors that can occur while obtaining a decision.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Failed to render a prompt template.
    #[error("template render error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// The LLM response could not be parsed into an in-range choice.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
