//! Core record structs for the Reflex experiment suite.
//!
//! Covers the 2-D vector used throughout the engine, the immutable
//! per-round record, the derived session result, synchronization marker
//! events, and the session export document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{MarkerKind, Role, RoundOutcome};
use crate::ids::{MarkerId, SessionId};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2-D vector in arena coordinates (pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector from components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Unit vector in the same direction, or zero if the length is ~0.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len < f64::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Component-wise addition.
    pub const fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Scale both components by a factor.
    pub const fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Rotate the vector by `angle` radians (counter-clockwise).
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.x.mul_add(cos, -self.y * sin),
            self.x.mul_add(sin, self.y * cos),
        )
    }
}

// ---------------------------------------------------------------------------
// RoundRecord
// ---------------------------------------------------------------------------

/// Immutable summary of one completed round.
///
/// Exactly one record is appended per completed round; an aborted round
/// produces none. `success` is reported from the participant's side:
/// true iff (role = Predator and capture occurred) or (role = Prey and
/// the timer expired without capture).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoundRecord {
    /// 1-based round index.
    pub round: u32,
    /// The participant's role this round.
    pub role: Role,
    /// How the round terminated.
    pub outcome: RoundOutcome,
    /// Whether the participant won the round.
    pub success: bool,
    /// Round duration in seconds (active play only).
    pub duration_s: f64,
    /// Mean distance to the opponent over the round, in pixels.
    pub avg_distance: f64,
    /// Minimum distance to the opponent over the round, in pixels.
    pub min_distance: f64,
    /// Time from round start to the participant's first input, in
    /// seconds; `None` if no input was given.
    pub reaction_time_s: Option<f64>,
    /// Number of stimuli fired during the round.
    pub stimulation_count: u32,
    /// Total path length traveled by the participant, in pixels.
    pub path_length: f64,
    /// Energy consumed by the participant over the round.
    pub energy_consumed: f64,
    /// Escape attempts counted for the AI prey (panic escalations).
    pub escape_attempts: u32,
    /// Catch attempts counted for the AI predator (chase escalations).
    pub catch_attempts: u32,
    /// Wall-clock time when the round ended.
    pub ended_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SessionResult
// ---------------------------------------------------------------------------

/// Aggregate statistics computed once over all round records at session
/// end. A pure function of the record list; never stored incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionResult {
    /// Number of rounds played in the predator role.
    pub predator_rounds: u32,
    /// Number of rounds played in the prey role.
    pub prey_rounds: u32,
    /// Success rate over predator rounds (0 when none were played).
    pub predator_success_rate: f64,
    /// Success rate over prey rounds (0 when none were played).
    pub prey_success_rate: f64,
    /// Mean reaction time across rounds with a recorded input, seconds.
    pub mean_reaction_time_s: f64,
    /// Total stimuli fired across the session.
    pub total_stimulations: u32,
    /// Total participant path length across the session, pixels.
    pub total_path_length: f64,
    /// Mean duration of successful escapes (prey wins), seconds; 0 when
    /// there were none.
    pub mean_escape_duration_s: f64,
    /// Mean duration of successful catches (predator wins), seconds; 0
    /// when there were none.
    pub mean_catch_duration_s: f64,
    /// Relative drop in mean stimulation count from the first half of
    /// the session to the second (positive = fewer stimuli later).
    pub adaptation_rate: f64,
}

// ---------------------------------------------------------------------------
// MarkerEvent
// ---------------------------------------------------------------------------

/// A timestamped synchronization marker handed to the physiological
/// sink at well-defined lifecycle points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarkerEvent {
    /// Unique marker identifier.
    pub id: MarkerId,
    /// The session this marker belongs to.
    pub session_id: SessionId,
    /// What happened.
    pub kind: MarkerKind,
    /// 1-based round index at emission time (0 before the first round).
    pub round: u32,
    /// Free-form payload (distance, intensity, role, ...).
    #[ts(type = "Record<string, unknown>")]
    pub payload: serde_json::Value,
    /// Wall-clock emission time.
    pub timestamp: DateTime<Utc>,
}

impl MarkerEvent {
    /// Create a marker for the given session and kind.
    pub fn new(
        session_id: SessionId,
        kind: MarkerKind,
        round: u32,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: MarkerId::new(),
            session_id,
            kind,
            round,
            payload,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionExport
// ---------------------------------------------------------------------------

/// The human-inspectable JSON document produced at session end.
///
/// Not a versioned schema: downstream analysis reads it ad hoc.
/// Timestamps serialize as ISO-8601 strings via chrono's serde impls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionExport {
    /// The session identifier.
    pub session_id: SessionId,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the export was produced.
    pub exported_at: DateTime<Utc>,
    /// The experiment configuration in effect, as loaded (post-clamp).
    #[ts(type = "Record<string, unknown>")]
    pub config: serde_json::Value,
    /// Every completed round, in order.
    pub records: Vec<RoundRecord>,
    /// The derived session summary.
    pub result: SessionResult,
    /// All markers captured during the session.
    pub markers: Vec<MarkerEvent>,
}
