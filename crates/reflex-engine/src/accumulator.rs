//! Per-round metric accumulation.
//!
//! A fresh accumulator is created at every round start and folded into
//! exactly one [`RoundRecord`] when the round terminates. Keeping the
//! in-flight state in an explicit value (instead of scattered mutable
//! counters) makes the fold total: nothing can be forgotten at round
//! end, and an aborted round simply drops the accumulator.

use chrono::Utc;
use reflex_types::{Role, RoundOutcome, RoundRecord};

use crate::policy::AttemptCounters;

/// In-flight statistics for the round being played.
#[derive(Debug, Clone)]
pub struct RoundAccumulator {
    round: u32,
    role: Role,
    distance_sum: f64,
    distance_samples: u32,
    min_distance: f64,
    reaction_time_s: Option<f64>,
    stimulation_count: u32,
}

impl RoundAccumulator {
    /// Start accumulating for round `round` with the participant in
    /// `role`.
    pub const fn new(round: u32, role: Role) -> Self {
        Self {
            round,
            role,
            distance_sum: 0.0,
            distance_samples: 0,
            min_distance: f64::INFINITY,
            reaction_time_s: None,
            stimulation_count: 0,
        }
    }

    /// The participant's role this round.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The 1-based round index.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Record the inter-entity distance for one tick.
    pub fn record_distance(&mut self, distance: f64) {
        self.distance_sum += distance;
        self.distance_samples = self.distance_samples.saturating_add(1);
        if distance < self.min_distance {
            self.min_distance = distance;
        }
    }

    /// Record the participant's first input, if none was seen yet.
    pub fn record_first_input(&mut self, at_s: f64) {
        if self.reaction_time_s.is_none() {
            self.reaction_time_s = Some(at_s);
        }
    }

    /// Count one fired stimulus.
    pub fn record_stimulation(&mut self) {
        self.stimulation_count = self.stimulation_count.saturating_add(1);
    }

    /// Stimuli fired so far this round.
    pub const fn stimulation_count(&self) -> u32 {
        self.stimulation_count
    }

    /// Fold the accumulated state into the round's immutable record.
    ///
    /// `success` is derived from the participant's side: a predator
    /// wins by capture, a prey wins by surviving to the timeout.
    pub fn finish(
        self,
        outcome: RoundOutcome,
        duration_s: f64,
        path_length: f64,
        energy_consumed: f64,
        counters: AttemptCounters,
    ) -> RoundRecord {
        let success = match (self.role, outcome) {
            (Role::Predator, RoundOutcome::Capture) | (Role::Prey, RoundOutcome::Timeout) => true,
            (
                Role::Predator | Role::Prey,
                RoundOutcome::Capture | RoundOutcome::Timeout | RoundOutcome::Aborted,
            ) => false,
        };
        let avg_distance = if self.distance_samples == 0 {
            0.0
        } else {
            self.distance_sum / f64::from(self.distance_samples)
        };
        let min_distance = if self.min_distance.is_finite() {
            self.min_distance
        } else {
            0.0
        };
        RoundRecord {
            round: self.round,
            role: self.role,
            outcome,
            success,
            duration_s,
            avg_distance,
            min_distance,
            reaction_time_s: self.reaction_time_s,
            stimulation_count: self.stimulation_count,
            path_length,
            energy_consumed,
            escape_attempts: counters.escape_attempts,
            catch_attempts: counters.catch_attempts,
            ended_at: Utc::now(),
        }
    }
}
