//! Error types for the simulation engine.
//!
//! There is no fatal error class anywhere in the engine's runtime path:
//! every tick-time failure mode has a defined fallback that keeps the
//! simulation loop running. The variants here cover setup mistakes
//! (bad configuration, illegal lifecycle transitions) and export I/O.

use reflex_types::SessionPhase;

/// Errors that can occur during engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A lifecycle method was called in a phase that does not allow it.
    #[error("cannot {action} while in the {phase:?} phase")]
    InvalidPhase {
        /// The operation that was attempted.
        action: &'static str,
        /// The session phase at the time of the call.
        phase: SessionPhase,
    },

    /// The round counter would overflow.
    #[error("round counter overflow")]
    RoundOverflow,

    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The session export document could not be serialized or written.
    #[error("export error: {message}")]
    Export {
        /// Description of the failure.
        message: String,
    },
}
