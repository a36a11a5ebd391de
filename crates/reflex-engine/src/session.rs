//! The round/session state machine.
//!
//! A session walks `Instruction -> Settings <-> Instruction -> Playing
//! <-> Paused -> Finished`; while playing, each round cycles
//! `Countdown -> Active -> Transition` and either rolls into the next
//! countdown or finishes the session. All simulated time comes from the
//! `dt` passed to [`Session::tick`]; a paused session simply stops
//! ticking round state, so no countdown or cooldown time is lost.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use reflex_types::{
    MarkerEvent, MarkerKind, Role, RoundOutcome, RoundPhase, RoundRecord, SessionId, SessionPhase,
    SessionResult, Vec2,
};
use tracing::{debug, info};

use crate::accumulator::RoundAccumulator;
use crate::clock::{Countdown, RoundClock};
use crate::config::SessionConfig;
use crate::entity::Entity;
use crate::error::EngineError;
use crate::input::{InputSampler, KeyToken};
use crate::marker::MarkerSink;
use crate::physics;
use crate::policy::{self, AttemptCounters, PolicyState};
use crate::stimulus::StimulusTrigger;

/// Number of random placements tried before falling back to fixed
/// opposite spawn points.
const SPAWN_ATTEMPTS: u32 = 16;

/// Per-round mutable state, dropped wholesale when a round is aborted.
struct RoundState {
    participant: Entity,
    ai: Entity,
    clock: RoundClock,
    countdown: Countdown,
    trigger: StimulusTrigger,
    accumulator: RoundAccumulator,
    policy_state: PolicyState,
    counters: AttemptCounters,
}

/// One participant session from instructions to export.
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    phase: SessionPhase,
    round_phase: RoundPhase,
    round: u32,
    started_at: DateTime<Utc>,
    rng: StdRng,
    sampler: InputSampler,
    sink: Box<dyn MarkerSink>,
    markers: Vec<MarkerEvent>,
    records: Vec<RoundRecord>,
    result: Option<SessionResult>,
    current: Option<RoundState>,
    transition: Countdown,
}

impl Session {
    /// Create a session in the instruction phase.
    pub fn new(config: SessionConfig, sink: Box<dyn MarkerSink>, rng: StdRng) -> Self {
        Self {
            id: SessionId::new(),
            config,
            phase: SessionPhase::Instruction,
            round_phase: RoundPhase::Countdown,
            round: 0,
            started_at: Utc::now(),
            rng,
            sampler: InputSampler::new(),
            sink,
            markers: Vec::new(),
            records: Vec::new(),
            result: None,
            current: None,
            transition: Countdown::new(0),
        }
    }

    /// The session identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// When the session was created.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The configuration in effect.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Current round sub-phase (meaningful while playing or paused).
    pub const fn round_phase(&self) -> RoundPhase {
        self.round_phase
    }

    /// 1-based index of the current round (0 before the first round).
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Records of every completed round so far.
    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    /// The session summary, available once finished.
    pub const fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Markers captured so far (also delivered to the sink).
    pub fn markers(&self) -> &[MarkerEvent] {
        &self.markers
    }

    /// The participant's entity, while a round exists.
    pub fn participant(&self) -> Option<&Entity> {
        self.current.as_ref().map(|r| &r.participant)
    }

    /// The AI entity, while a round exists.
    pub fn opponent(&self) -> Option<&Entity> {
        self.current.as_ref().map(|r| &r.ai)
    }

    /// Whole seconds left on the pre-round countdown.
    pub fn countdown_remaining_s(&self) -> u32 {
        self.current.as_ref().map_or(0, |r| r.countdown.remaining_s())
    }

    /// Whether the stimulation indicator is currently visible.
    pub fn stimulus_visible(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|r| r.trigger.visible(r.clock.elapsed_s()))
    }

    /// Switch from the instructions to the settings panel.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPhase`] outside the instruction
    /// phase.
    pub fn open_settings(&mut self) -> Result<(), EngineError> {
        if self.phase != SessionPhase::Instruction {
            return Err(EngineError::InvalidPhase {
                action: "open settings",
                phase: self.phase,
            });
        }
        self.phase = SessionPhase::Settings;
        Ok(())
    }

    /// Apply a new configuration and return to the instructions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPhase`] outside the settings phase.
    pub fn apply_settings(&mut self, config: SessionConfig) -> Result<(), EngineError> {
        if self.phase != SessionPhase::Settings {
            return Err(EngineError::InvalidPhase {
                action: "apply settings",
                phase: self.phase,
            });
        }
        self.config = config;
        self.phase = SessionPhase::Instruction;
        Ok(())
    }

    /// Start playing: record the session start and set up round 1.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPhase`] if the session has already
    /// started.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if !matches!(
            self.phase,
            SessionPhase::Instruction | SessionPhase::Settings
        ) {
            return Err(EngineError::InvalidPhase {
                action: "start",
                phase: self.phase,
            });
        }
        self.phase = SessionPhase::Playing;
        self.started_at = Utc::now();
        self.emit(MarkerKind::SessionStart, serde_json::json!({}));
        info!(session = %self.id, rounds = self.config.rounds.total_rounds, "session started");
        self.start_new_round()
    }

    /// Route a key press into the sampler. Dropped unless a round is
    /// actively playing.
    pub fn key_down(&mut self, key: &str) {
        if let Some(token) = KeyToken::from_key(key) {
            self.sampler.key_down(token);
        }
    }

    /// Route a key release into the sampler.
    pub fn key_up(&mut self, key: &str) {
        if let Some(token) = KeyToken::from_key(key) {
            self.sampler.key_up(token);
        }
    }

    /// Advance the simulation by `dt` seconds. No-op unless playing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RoundOverflow`] if the round counter
    /// cannot be advanced (practically unreachable).
    pub fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        if self.phase != SessionPhase::Playing {
            return Ok(());
        }
        match self.round_phase {
            RoundPhase::Countdown => {
                if let Some(state) = self.current.as_mut() {
                    state.countdown.advance(dt);
                    if state.countdown.finished() {
                        self.round_phase = RoundPhase::Active;
                        self.sampler.set_enabled(true);
                        debug!(round = self.round, "round active");
                    }
                }
                Ok(())
            }
            RoundPhase::Active => {
                if let Some(outcome) = self.tick_active(dt) {
                    self.end_round(outcome);
                }
                Ok(())
            }
            RoundPhase::Transition => {
                self.transition.advance(dt);
                if self.transition.finished() {
                    if self.round < self.config.rounds.total_rounds {
                        self.start_new_round()?;
                    } else {
                        self.finish_session();
                    }
                }
                Ok(())
            }
        }
    }

    /// Toggle between playing and paused. The countdown, round timer,
    /// and stimulus cooldown all freeze while paused.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPhase`] unless playing or paused.
    pub fn toggle_pause(&mut self) -> Result<(), EngineError> {
        match self.phase {
            SessionPhase::Playing => {
                self.phase = SessionPhase::Paused;
                self.sampler.set_enabled(false);
                self.emit(MarkerKind::PauseToggled, serde_json::json!({"paused": true}));
                Ok(())
            }
            SessionPhase::Paused => {
                self.phase = SessionPhase::Playing;
                if self.round_phase == RoundPhase::Active {
                    self.sampler.set_enabled(true);
                }
                self.emit(
                    MarkerKind::PauseToggled,
                    serde_json::json!({"paused": false}),
                );
                Ok(())
            }
            SessionPhase::Instruction | SessionPhase::Settings | SessionPhase::Finished => {
                Err(EngineError::InvalidPhase {
                    action: "toggle pause",
                    phase: self.phase,
                })
            }
        }
    }

    /// Tear the session down early. The in-flight round is cancelled
    /// without a record; the summary covers completed rounds only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPhase`] unless playing or paused.
    pub fn abort(&mut self) -> Result<(), EngineError> {
        if !matches!(self.phase, SessionPhase::Playing | SessionPhase::Paused) {
            return Err(EngineError::InvalidPhase {
                action: "abort",
                phase: self.phase,
            });
        }
        self.current = None;
        self.sampler.set_enabled(false);
        info!(session = %self.id, completed = self.records.len(), "session aborted");
        self.finish_session();
        Ok(())
    }

    /// One active-play tick; returns the outcome if the round ended.
    fn tick_active(&mut self, dt: f64) -> Option<RoundOutcome> {
        let intent = self.sampler.intent();
        let state = self.current.as_mut()?;
        state.clock.advance(dt);
        let now = state.clock.elapsed_s();

        if intent.is_moving() {
            state.accumulator.record_first_input(now);
        }

        physics::integrate_intent(
            &mut state.participant,
            &intent,
            &self.config.movement,
            &self.config.arena,
            dt,
        );
        let velocity = policy::steer(
            &mut state.ai,
            state.participant.position,
            self.config.movement.base_speed,
            &self.config.tuning,
            &mut state.policy_state,
            &mut state.counters,
            &mut self.rng,
            dt,
        );
        physics::apply_velocity(&mut state.ai, velocity, &self.config.arena, dt);

        let distance = state.participant.position.distance(state.ai.position);
        state.accumulator.record_distance(distance);
        let capture_distance = (state.participant.size + state.ai.size) / 2.0;

        if let Some(fire) = state.trigger.tick(now, distance) {
            state.participant.apply_damage(fire.intensity);
            state.accumulator.record_stimulation();
            let payload = serde_json::json!({
                "distance": fire.distance,
                "intensity": fire.intensity,
                "role": state.accumulator.role(),
            });
            self.emit(MarkerKind::StimulusFired, payload);
        }

        if distance <= capture_distance {
            Some(RoundOutcome::Capture)
        } else if now >= self.config.rounds.duration_s {
            Some(RoundOutcome::Timeout)
        } else {
            None
        }
    }

    /// Set up the next round: roles, spawns, fresh per-round state.
    fn start_new_round(&mut self) -> Result<(), EngineError> {
        self.round = self.round.checked_add(1).ok_or(EngineError::RoundOverflow)?;

        let participant_role = if self.rng.random_bool(0.5) {
            Role::Predator
        } else {
            Role::Prey
        };
        let ai_role = participant_role.opposite();
        let (participant_pos, ai_pos) = self.spawn_positions(participant_role, ai_role);

        let movement = self.config.movement;
        let participant = Entity::new(
            participant_role,
            participant_pos,
            self.entity_size(participant_role),
            movement.trail_capacity,
        );
        let ai = Entity::new(
            ai_role,
            ai_pos,
            self.entity_size(ai_role),
            movement.trail_capacity,
        );

        self.sampler.set_enabled(false);
        self.current = Some(RoundState {
            participant,
            ai,
            clock: RoundClock::new(),
            countdown: Countdown::new(self.config.rounds.countdown_s),
            trigger: StimulusTrigger::new(self.config.stimulation),
            accumulator: RoundAccumulator::new(self.round, participant_role),
            policy_state: PolicyState::default(),
            counters: AttemptCounters::default(),
        });
        self.round_phase = RoundPhase::Countdown;

        self.emit(
            MarkerKind::RoundStart,
            serde_json::json!({"role": participant_role}),
        );
        info!(round = self.round, role = ?participant_role, "round started");
        Ok(())
    }

    /// Freeze input, fold the accumulator into a record, and enter the
    /// transition overlay.
    fn end_round(&mut self, outcome: RoundOutcome) {
        self.sampler.set_enabled(false);
        let Some(state) = self.current.take() else {
            return;
        };
        let record = state.accumulator.finish(
            outcome,
            state.clock.elapsed_s(),
            state.participant.path_length(),
            state.participant.energy_consumed(),
            state.counters,
        );
        self.emit(
            MarkerKind::RoundEnd,
            serde_json::json!({"outcome": outcome, "success": record.success}),
        );
        info!(
            round = record.round,
            outcome = ?outcome,
            success = record.success,
            duration_s = record.duration_s,
            "round ended"
        );
        self.records.push(record);
        self.transition = Countdown::new(self.config.rounds.transition_s);
        self.round_phase = RoundPhase::Transition;
    }

    /// Compute the summary and enter the finished phase.
    fn finish_session(&mut self) {
        self.current = None;
        let result = crate::metrics::aggregate(&self.records);
        self.emit(
            MarkerKind::SessionComplete,
            serde_json::json!({"rounds": self.records.len()}),
        );
        info!(
            session = %self.id,
            rounds = self.records.len(),
            total_stimulations = result.total_stimulations,
            "session complete"
        );
        self.result = Some(result);
        self.phase = SessionPhase::Finished;
    }

    /// Emit a marker to the sink and the internal capture buffer.
    pub(crate) fn emit(&mut self, kind: MarkerKind, payload: serde_json::Value) {
        let event = MarkerEvent::new(self.id, kind, self.round, payload);
        self.sink.emit(&event);
        self.markers.push(event);
    }

    fn entity_size(&self, role: Role) -> f64 {
        match role {
            Role::Predator => self.config.movement.predator_size,
            Role::Prey => self.config.movement.prey_size,
        }
    }

    /// Draw two spawn positions at least the configured separation
    /// apart, falling back to fixed opposite points if the draw keeps
    /// missing.
    fn spawn_positions(&mut self, participant_role: Role, ai_role: Role) -> (Vec2, Vec2) {
        let arena = self.config.arena;
        let margin_a = self.entity_size(participant_role);
        let margin_b = self.entity_size(ai_role);
        for _ in 0..SPAWN_ATTEMPTS {
            let a = Vec2::new(
                self.rng.random_range(margin_a..=arena.width - margin_a),
                self.rng.random_range(margin_a..=arena.height - margin_a),
            );
            let b = Vec2::new(
                self.rng.random_range(margin_b..=arena.width - margin_b),
                self.rng.random_range(margin_b..=arena.height - margin_b),
            );
            if a.distance(b) >= self.config.tuning.min_spawn_separation {
                return (a, b);
            }
        }
        (
            Vec2::new(arena.width * 0.25, arena.height * 0.5),
            Vec2::new(arena.width * 0.75, arena.height * 0.5),
        )
    }
}
