//! Enumeration types for the Reflex experiment suite.
//!
//! Roles, session and round phases, round outcomes, and the
//! synchronization-marker vocabulary shared by every experiment.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The behavioral role assigned to an entity for one round.
///
/// Roles are re-randomized at the start of every round. Exactly one
/// entity holds [`Role::Predator`] and the other [`Role::Prey`] at all
/// times during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Capture-seeking role: wins by closing to capture distance.
    Predator,
    /// Evasion role: wins by surviving until the round timer expires.
    Prey,
}

impl Role {
    /// Return the opposite role.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Predator => Self::Prey,
            Self::Prey => Self::Predator,
        }
    }
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Top-level phase of an experiment session.
///
/// Transitions: `Instruction -> Settings <-> Instruction -> Playing <->
/// Paused -> Finished`. The per-round sub-cycle lives in [`RoundPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SessionPhase {
    /// Showing task instructions; no round state exists yet.
    Instruction,
    /// Adjusting arena settings before the session starts.
    Settings,
    /// Rounds are running (see [`RoundPhase`] for the sub-cycle).
    Playing,
    /// Playback suspended; all timers frozen.
    Paused,
    /// All rounds complete; the session result has been computed.
    Finished,
}

/// Sub-phase of a single round while the session is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RoundPhase {
    /// Pre-round countdown; entities are placed but frozen.
    Countdown,
    /// Live pursuit; physics and the round timer advance.
    Active,
    /// Post-round overlay before the next round begins.
    Transition,
}

/// How a round terminated.
///
/// Every round ends in exactly one of these ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RoundOutcome {
    /// Distance dropped to the capture threshold; the predator wins.
    Capture,
    /// The round timer reached zero without a capture; the prey wins.
    Timeout,
    /// The session was torn down mid-round; no record is produced.
    Aborted,
}

// ---------------------------------------------------------------------------
// Synchronization markers
// ---------------------------------------------------------------------------

/// Kind of synchronization marker emitted to the physiological sink.
///
/// Markers are fire-and-forget timestamped events consumed by downstream
/// analysis; the engine does not depend on their transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MarkerKind {
    /// A session began.
    SessionStart,
    /// A round began (after role assignment and placement).
    RoundStart,
    /// A round ended with an outcome.
    RoundEnd,
    /// A proximity stimulus fired.
    StimulusFired,
    /// The pause state flipped.
    PauseToggled,
    /// All rounds finished and the session result was computed.
    SessionComplete,
    /// The session export document was written.
    DataExport,
}
