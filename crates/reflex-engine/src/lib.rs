//! Pursuit simulation engine for the Reflex experiment suite.
//!
//! This crate owns the predator/prey session: entity state, input
//! sampling, physics integration, the AI steering policy, the proximity
//! stimulus trigger, the round/session state machine, metric
//! aggregation, synchronization markers, and the session export. It
//! also carries the supplementary speed-duel experiment.
//!
//! # Modules
//!
//! - [`accumulator`] -- Per-round statistic accumulation folded into a
//!   `RoundRecord` at round end.
//! - [`clock`] -- Simulated-time countdown and round clock (no wall
//!   time anywhere in the engine).
//! - [`config`] -- YAML configuration with per-field defaults and
//!   range clamping.
//! - [`entity`] -- Entity state with clamped vitals and bounded trail.
//! - [`error`] -- [`EngineError`].
//! - [`export`] -- Session export document assembly and write.
//! - [`input`] -- Held-key sampling into normalized movement intents.
//! - [`marker`] -- [`MarkerSink`] trait with tracing and in-memory
//!   sinks.
//! - [`metrics`] -- `RoundRecord` list to `SessionResult` aggregation.
//! - [`physics`] -- Per-tick integration with arena clamping and the
//!   energy model.
//! - [`policy`] -- Predator/prey AI steering.
//! - [`session`] -- The round/session state machine.
//! - [`speed`] -- The speed-duel experiment.
//! - [`stimulus`] -- Cooldown-gated proximity stimulus trigger.
//!
//! [`EngineError`]: error::EngineError
//! [`MarkerSink`]: marker::MarkerSink

pub mod accumulator;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod export;
pub mod input;
pub mod marker;
pub mod metrics;
pub mod physics;
pub mod policy;
pub mod session;
pub mod speed;
pub mod stimulus;
