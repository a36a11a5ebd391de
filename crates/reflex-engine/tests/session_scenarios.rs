//! End-to-end session scenarios: capture, timeout, pause, and the full
//! round lifecycle, driven through the public API at a fixed 60 Hz.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use reflex_engine::config::SessionConfig;
use reflex_engine::error::EngineError;
use reflex_engine::export::build_export;
use reflex_engine::marker::MemorySink;
use reflex_engine::session::Session;
use reflex_types::{MarkerKind, Role, RoundOutcome, RoundPhase, SessionPhase};

const DT: f64 = 1.0 / 60.0;

fn config() -> SessionConfig {
    SessionConfig::default()
}

/// Start sessions over a range of seeds until round 1 assigns the
/// participant the wanted role. Role assignment is a 50/50 draw, so a
/// small seed range always contains both.
fn session_with_role(role: Role, cfg: &SessionConfig) -> Session {
    for seed in 0..64 {
        let mut session = Session::new(
            cfg.clone(),
            Box::new(MemorySink::new()),
            StdRng::seed_from_u64(seed),
        );
        session.start().unwrap();
        if session.participant().unwrap().role == role {
            return session;
        }
    }
    panic!("no seed assigned the {role:?} role");
}

/// Tick until the first round record appears, with a generous bound.
fn run_until_first_record(session: &mut Session, max_ticks: u32) {
    for _ in 0..max_ticks {
        session.tick(DT).unwrap();
        if !session.records().is_empty() {
            return;
        }
    }
    panic!("round did not terminate within {max_ticks} ticks");
}

#[test]
fn idle_prey_is_captured() {
    let cfg = config();
    let mut session = session_with_role(Role::Prey, &cfg);
    run_until_first_record(&mut session, 60 * 40);

    let record = session.records().first().unwrap();
    assert_eq!(record.outcome, RoundOutcome::Capture);
    assert!(!record.success, "a captured prey participant lost");
    assert!(record.duration_s < cfg.rounds.duration_s);
    // The predator had to pass inside the stimulus threshold on the way
    // in, so at least one stimulus fired.
    assert!(record.stimulation_count >= 1);
    assert!(
        session
            .markers()
            .iter()
            .any(|m| m.kind == MarkerKind::StimulusFired)
    );
}

#[test]
fn idle_predator_round_times_out() {
    let cfg = config();
    let mut session = session_with_role(Role::Predator, &cfg);
    run_until_first_record(&mut session, 60 * 40);

    let record = session.records().first().unwrap();
    assert_eq!(record.outcome, RoundOutcome::Timeout);
    assert!(!record.success, "an idle predator never catches anything");
    assert!(record.duration_s >= cfg.rounds.duration_s);
}

#[test]
fn pause_preserves_the_countdown() {
    let mut session = Session::new(
        config(),
        Box::new(MemorySink::new()),
        StdRng::seed_from_u64(3),
    );
    session.start().unwrap();
    assert_eq!(session.round_phase(), RoundPhase::Countdown);

    // Just past one second into the three-second countdown.
    for _ in 0..70 {
        session.tick(DT).unwrap();
    }
    let before = session.countdown_remaining_s();
    assert_eq!(before, 2);

    session.toggle_pause().unwrap();
    assert_eq!(session.phase(), SessionPhase::Paused);
    for _ in 0..600 {
        session.tick(DT).unwrap();
    }
    assert_eq!(session.countdown_remaining_s(), before);

    session.toggle_pause().unwrap();
    assert_eq!(session.phase(), SessionPhase::Playing);
    assert_eq!(session.countdown_remaining_s(), before);
}

#[test]
fn full_session_runs_to_finished_with_one_record_per_round() {
    let cfg = SessionConfig::parse("rounds:\n  duration_s: 15\n  total_rounds: 2\n").unwrap();
    let mut session = Session::new(
        cfg.clone(),
        Box::new(MemorySink::new()),
        StdRng::seed_from_u64(9),
    );
    session.start().unwrap();

    let max_ticks = 60 * 60;
    for _ in 0..max_ticks {
        session.tick(DT).unwrap();
        if session.phase() == SessionPhase::Finished {
            break;
        }
    }

    assert_eq!(session.phase(), SessionPhase::Finished);
    assert_eq!(session.records().len(), 2);
    for (i, record) in session.records().iter().enumerate() {
        let expected_round = u32::try_from(i).unwrap() + 1;
        assert_eq!(record.round, expected_round);
        assert!(matches!(
            record.outcome,
            RoundOutcome::Capture | RoundOutcome::Timeout
        ));
        // Success is always reported from the participant's side.
        let expected_success = matches!(
            (record.role, record.outcome),
            (Role::Predator, RoundOutcome::Capture) | (Role::Prey, RoundOutcome::Timeout)
        );
        assert_eq!(record.success, expected_success);
    }

    let result = session.result().unwrap();
    assert_eq!(result.predator_rounds + result.prey_rounds, 2);

    let kinds: Vec<MarkerKind> = session.markers().iter().map(|m| m.kind).collect();
    assert_eq!(kinds.first(), Some(&MarkerKind::SessionStart));
    assert_eq!(kinds.last(), Some(&MarkerKind::SessionComplete));
    let round_starts = kinds
        .iter()
        .filter(|k| **k == MarkerKind::RoundStart)
        .count();
    let round_ends = kinds.iter().filter(|k| **k == MarkerKind::RoundEnd).count();
    assert_eq!(round_starts, 2);
    assert_eq!(round_ends, 2);
}

#[test]
fn sink_receives_the_same_markers_the_session_captures() {
    let sink = MemorySink::new();
    let mut session = Session::new(
        config(),
        Box::new(sink.clone()),
        StdRng::seed_from_u64(5),
    );
    session.start().unwrap();
    for _ in 0..240 {
        session.tick(DT).unwrap();
    }
    session.abort().unwrap();

    let delivered = sink.snapshot();
    assert_eq!(delivered.len(), session.markers().len());
    assert!(delivered.iter().any(|m| m.kind == MarkerKind::SessionStart));
}

#[test]
fn aborted_round_leaves_no_partial_record() {
    let mut session = Session::new(
        config(),
        Box::new(MemorySink::new()),
        StdRng::seed_from_u64(2),
    );
    session.start().unwrap();
    // Into active play, then tear down mid-round.
    for _ in 0..600 {
        session.tick(DT).unwrap();
    }
    session.abort().unwrap();

    assert_eq!(session.phase(), SessionPhase::Finished);
    assert!(session.records().is_empty());
    assert!(session.result().is_some());

    let export = build_export(&mut session).unwrap();
    assert!(export.records.is_empty());
}

#[test]
fn lifecycle_calls_outside_their_phase_are_rejected() {
    let mut session = Session::new(
        config(),
        Box::new(MemorySink::new()),
        StdRng::seed_from_u64(1),
    );
    assert!(matches!(
        session.toggle_pause(),
        Err(EngineError::InvalidPhase { .. })
    ));
    assert!(matches!(
        session.abort(),
        Err(EngineError::InvalidPhase { .. })
    ));

    session.start().unwrap();
    assert!(matches!(
        session.start(),
        Err(EngineError::InvalidPhase { .. })
    ));
    assert!(matches!(
        session.open_settings(),
        Err(EngineError::InvalidPhase { .. })
    ));
}

#[test]
fn settings_round_trip_updates_the_config() {
    let mut session = Session::new(
        config(),
        Box::new(MemorySink::new()),
        StdRng::seed_from_u64(1),
    );
    session.open_settings().unwrap();
    assert_eq!(session.phase(), SessionPhase::Settings);

    let updated = SessionConfig::parse("rounds:\n  total_rounds: 4\n").unwrap();
    session.apply_settings(updated).unwrap();
    assert_eq!(session.phase(), SessionPhase::Instruction);
    assert_eq!(session.config().rounds.total_rounds, 4);
}

#[test]
fn input_is_ignored_during_the_countdown() {
    let cfg = config();
    let mut session = session_with_role(Role::Prey, &cfg);
    session.key_down("ArrowRight");
    let spawn = session.participant().unwrap().position;

    // Still counting down: the held key must not move the entity.
    for _ in 0..60 {
        session.tick(DT).unwrap();
    }
    let after = session.participant().unwrap().position;
    assert!((after.x - spawn.x).abs() < f64::EPSILON);
    assert!((after.y - spawn.y).abs() < f64::EPSILON);
}

#[test]
fn first_input_sets_the_reaction_time() {
    let cfg = config();
    let mut session = session_with_role(Role::Predator, &cfg);
    // Through the countdown into active play.
    for _ in 0..200 {
        session.tick(DT).unwrap();
    }
    assert_eq!(session.round_phase(), RoundPhase::Active);

    session.key_down("ArrowUp");
    for _ in 0..10 {
        session.tick(DT).unwrap();
    }
    session.key_up("ArrowUp");

    run_until_first_record(&mut session, 60 * 40);
    let record = session.records().first().unwrap();
    let reaction = record.reaction_time_s.unwrap();
    assert!(reaction > 0.0);
    assert!(reaction < record.duration_s);
}
