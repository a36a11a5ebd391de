//! Headless session runner for the Reflex experiment suite.
//!
//! Drives a full pursuit/evasion session with a scripted participant at
//! a fixed 60 Hz tick rate and writes the JSON export when the session
//! finishes. With `REFLEX_DUEL=1` it instead runs the speed-duel
//! experiment with the opponent driven by the LLM decision oracle
//! (falling back to uniform random choices when the oracle is
//! unavailable or fails).
//!
//! Environment:
//!
//! - `REFLEX_CONFIG` -- optional path to a YAML session config (the
//!   first CLI argument takes precedence).
//! - `REFLEX_EXPORT_PATH` -- export destination (default
//!   `session-export.json`).
//! - `REFLEX_SEED` -- RNG seed (default 42).
//! - `REFLEX_DUEL` -- set to `1`/`true` to run the speed duel.
//! - `ORACLE_*` -- oracle backend configuration (duel only).

mod script;

use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reflex_engine::config::SessionConfig;
use reflex_engine::export;
use reflex_engine::marker::TracingSink;
use reflex_engine::session::Session;
use reflex_engine::speed::{OpponentPolicy, SPEED_LEVELS, SpeedDuel, SpeedLevel};
use reflex_oracle::{Decision, Oracle};
use reflex_types::SessionPhase;

use crate::script::ScriptedPilot;

/// Session simulation step, matching the browser's frame rate.
const TICK_S: f64 = 1.0 / 60.0;
/// Duel simulation step.
const DUEL_TICK_S: f64 = 1.0 / 30.0;
/// Rounds in an oracle-driven duel.
const DUEL_ROUNDS: u32 = 10;
/// Hard wall-clock budget for a duel, in simulated seconds.
const DUEL_BUDGET_S: f64 = 600.0;

/// Entry point: initialize logging, read the environment, and run
/// either the pursuit session or the speed duel.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let seed = std::env::var("REFLEX_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);

    if matches!(
        std::env::var("REFLEX_DUEL").as_deref(),
        Ok("1" | "true" | "yes")
    ) {
        return run_duel(seed).await;
    }

    // Config path: first CLI argument, then REFLEX_CONFIG, then defaults.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("REFLEX_CONFIG").ok());
    let config = config_path
        .map(|path| {
            SessionConfig::from_file(Path::new(&path))
                .with_context(|| format!("loading config from {path}"))
        })
        .transpose()?
        .unwrap_or_default();
    let export_path = std::env::var("REFLEX_EXPORT_PATH")
        .map_or_else(|_| PathBuf::from("session-export.json"), PathBuf::from);

    run_session(config, &export_path, seed)
}

/// Run one scripted session to completion and write the export.
fn run_session(config: SessionConfig, export_path: &Path, seed: u64) -> anyhow::Result<()> {
    info!(
        seed,
        rounds = config.rounds.total_rounds,
        duration_s = config.rounds.duration_s,
        "starting scripted session"
    );

    // Generous upper bound: every round at full duration plus both
    // overlays, with slack for float accumulation.
    let per_round_s = config.rounds.duration_s
        + f64::from(config.rounds.countdown_s)
        + f64::from(config.rounds.transition_s)
        + 5.0;
    let budget_s = f64::from(config.rounds.total_rounds) * per_round_s;

    let mut session = Session::new(config, Box::new(TracingSink), StdRng::seed_from_u64(seed));
    session.start().context("starting session")?;

    let pilot = ScriptedPilot::new();
    let mut elapsed = 0.0;
    while session.phase() != SessionPhase::Finished && elapsed < budget_s {
        pilot.drive(&mut session);
        session.tick(TICK_S).context("ticking session")?;
        elapsed += TICK_S;
    }

    if session.phase() != SessionPhase::Finished {
        warn!(elapsed_s = elapsed, "session overran its budget, aborting");
        session.abort().context("aborting overrun session")?;
    }

    let export = export::build_export(&mut session).context("building export")?;
    export::write_export(&export, export_path).context("writing export")?;

    let result = &export.result;
    info!(
        rounds = export.records.len(),
        predator_success_rate = result.predator_success_rate,
        prey_success_rate = result.prey_success_rate,
        total_stimulations = result.total_stimulations,
        adaptation_rate = result.adaptation_rate,
        "session summary"
    );
    Ok(())
}

/// Run the speed duel with the opponent driven by the oracle.
async fn run_duel(seed: u64) -> anyhow::Result<()> {
    let oracle = Oracle::from_env()
        .map_err(|e| warn!(error = %e, "oracle unavailable, every choice falls back to random"))
        .ok();
    let mut fallback_rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    let mut duel = SpeedDuel::new(
        DUEL_ROUNDS,
        Some(OpponentPolicy::External),
        StdRng::seed_from_u64(seed),
    );
    duel.start();
    info!(seed, rounds = DUEL_ROUNDS, "starting oracle-driven duel");

    let mut decided_round = 0;
    let mut elapsed = 0.0;
    while !duel.is_complete() && elapsed < DUEL_BUDGET_S {
        if duel.round() != decided_round && !duel.round_ended() {
            decided_round = duel.round();
            let decision = decide(oracle.as_ref(), &duel, &mut fallback_rng).await;
            if let Some(rationale) = &decision.rationale {
                info!(
                    round = duel.round(),
                    choice = decision.choice,
                    rationale = %rationale,
                    "opponent choice"
                );
            }
            duel.apply_opponent_choice(decision.choice);
            // The scripted player always picks the fast (but not
            // maximum) level.
            duel.choose_speed(SpeedLevel::Fast);
        }
        duel.update(DUEL_TICK_S);
        elapsed += DUEL_TICK_S;
    }

    let Some(results) = duel.results() else {
        anyhow::bail!("duel overran its budget without completing");
    };
    info!(
        score = results.score,
        opponent_score = results.opponent_score,
        win_rate = results.win_rate,
        average_speed = results.average_speed,
        high_speed_rate = results.high_speed_rate,
        trials = duel.trials(),
        "duel summary"
    );
    Ok(())
}

/// One opponent decision: ask the oracle, fall back to uniform random
/// on any failure. Never retries.
async fn decide(oracle: Option<&Oracle>, duel: &SpeedDuel, rng: &mut StdRng) -> Decision {
    let Some(oracle) = oracle else {
        return Decision::fallback(SPEED_LEVELS.len(), rng);
    };
    let context = serde_json::json!({
        "round": duel.round(),
        "total_rounds": duel.total_rounds(),
        "player_score": duel.player_score(),
        "opponent_score": duel.opponent_score(),
        "history": duel.choice_history(),
        "options": SPEED_LEVELS,
        "max_index": SPEED_LEVELS.len().saturating_sub(1),
    });
    oracle
        .decide(&context, SPEED_LEVELS.len())
        .await
        .unwrap_or_else(|e| {
            warn!(round = duel.round(), error = %e, "oracle failed, falling back");
            Decision::fallback(SPEED_LEVELS.len(), rng)
        })
}
