//! AI steering policy for the computer-controlled entity.
//!
//! The policy computes a per-second velocity from the AI's role and the
//! relative distance to the opponent. The predator closes faster the
//! nearer it gets (chase intensity); the prey flees along a noisy
//! escape angle and speeds up as the predator approaches (panic level).
//! Sustained escalation above the configured thresholds costs extra
//! energy and counts a catch/escape attempt on each threshold crossing.

use rand::Rng;
use reflex_types::{Role, Vec2};

use crate::config::TuningConfig;
use crate::entity::Entity;
use crate::physics::SPEED_SCALE;

/// Per-round escalation state retained between ticks.
///
/// Attempts are edge-triggered: a sustained chase above the threshold
/// counts once, not once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyState {
    escalated: bool,
}

/// Attempt counters shared with the round accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptCounters {
    /// Chase escalations by an AI predator.
    pub catch_attempts: u32,
    /// Panic escalations by an AI prey.
    pub escape_attempts: u32,
}

/// Compute the AI entity's velocity for this tick and apply the
/// policy's energy effects.
///
/// Side effects are confined to the AI entity's own energy, the
/// escalation state, and the shared attempt counters; the caller
/// integrates the returned velocity.
pub fn steer<R: Rng + ?Sized>(
    ai: &mut Entity,
    opponent_position: Vec2,
    base_speed: f64,
    tuning: &TuningConfig,
    state: &mut PolicyState,
    counters: &mut AttemptCounters,
    rng: &mut R,
    dt: f64,
) -> Vec2 {
    let distance = ai.position.distance(opponent_position);

    let velocity = match ai.role {
        Role::Predator => {
            let chase_intensity = ((100.0 - distance) / 100.0).clamp(0.0, 1.0);
            let speed = base_speed * chase_intensity.mul_add(0.3, 0.7) * SPEED_SCALE;
            let toward = Vec2::new(
                opponent_position.x - ai.position.x,
                opponent_position.y - ai.position.y,
            )
            .normalized();

            escalate(
                chase_intensity > tuning.chase_escalation_threshold,
                ai,
                state,
                &mut counters.catch_attempts,
                tuning,
                dt,
            );

            toward.scale(speed)
        }
        Role::Prey => {
            let panic_level = ((150.0 - distance) / 150.0).clamp(0.0, 1.0);
            let speed = base_speed * panic_level.mul_add(0.2, 0.8) * SPEED_SCALE;
            let away = Vec2::new(
                ai.position.x - opponent_position.x,
                ai.position.y - opponent_position.y,
            )
            .normalized();
            let noise = rng.random_range(-tuning.evasion_noise_rad..=tuning.evasion_noise_rad);

            escalate(
                panic_level > tuning.panic_escalation_threshold,
                ai,
                state,
                &mut counters.escape_attempts,
                tuning,
                dt,
            );

            away.rotated(noise).scale(speed)
        }
    };

    // Out of pressure range the AI recovers energy.
    if distance > tuning.energy_regen_distance {
        ai.regain_energy(tuning.escalation_energy_cost * dt * 0.5);
    }

    velocity
}

/// Apply escalation energy cost and count threshold crossings.
fn escalate(
    above_threshold: bool,
    ai: &mut Entity,
    state: &mut PolicyState,
    attempts: &mut u32,
    tuning: &TuningConfig,
    dt: f64,
) {
    if above_threshold {
        ai.spend_energy(tuning.escalation_energy_cost * dt);
        if !state.escalated {
            *attempts = attempts.saturating_add(1);
        }
    }
    state.escalated = above_threshold;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const DT: f64 = 1.0 / 60.0;
    const BASE_SPEED: f64 = 4.0;

    fn ai(role: Role, x: f64, y: f64) -> Entity {
        Entity::new(role, Vec2::new(x, y), 20.0, 600)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn predator_steers_toward_prey() {
        let mut predator = ai(Role::Predator, 100.0, 100.0);
        let mut state = PolicyState::default();
        let mut counters = AttemptCounters::default();
        let v = steer(
            &mut predator,
            Vec2::new(400.0, 100.0),
            BASE_SPEED,
            &TuningConfig::default(),
            &mut state,
            &mut counters,
            &mut rng(),
            DT,
        );
        assert!(v.x > 0.0);
        assert!(v.y.abs() < 1e-9);
    }

    #[test]
    fn predator_closes_faster_when_near() {
        let tuning = TuningConfig::default();
        let mut far = ai(Role::Predator, 100.0, 100.0);
        let mut near = ai(Role::Predator, 100.0, 100.0);
        let mut state = PolicyState::default();
        let mut counters = AttemptCounters::default();
        let v_far = steer(
            &mut far,
            Vec2::new(700.0, 100.0),
            BASE_SPEED,
            &tuning,
            &mut state,
            &mut counters,
            &mut rng(),
            DT,
        );
        let v_near = steer(
            &mut near,
            Vec2::new(120.0, 100.0),
            BASE_SPEED,
            &tuning,
            &mut state,
            &mut counters,
            &mut rng(),
            DT,
        );
        assert!(v_near.length() > v_far.length());
        // At 600 px the intensity is zero: speed is 0.7 * base.
        assert!((v_far.length() - BASE_SPEED * 0.7 * SPEED_SCALE).abs() < 1e-9);
    }

    #[test]
    fn prey_flees_away_from_predator() {
        let mut prey = ai(Role::Prey, 400.0, 300.0);
        let mut state = PolicyState::default();
        let mut counters = AttemptCounters::default();
        let v = steer(
            &mut prey,
            Vec2::new(380.0, 300.0),
            BASE_SPEED,
            &TuningConfig::default(),
            &mut state,
            &mut counters,
            &mut rng(),
            DT,
        );
        // Noise is at most 0.25 rad, so the flee vector still points
        // dominantly away from the predator.
        assert!(v.x > 0.0);
    }

    #[test]
    fn sustained_escalation_counts_one_attempt() {
        let tuning = TuningConfig::default();
        let mut predator = ai(Role::Predator, 100.0, 100.0);
        let mut state = PolicyState::default();
        let mut counters = AttemptCounters::default();
        let mut r = rng();
        // Well inside escalation range (distance 10 -> intensity 0.9).
        for _ in 0..30 {
            let _ = steer(
                &mut predator,
                Vec2::new(110.0, 100.0),
                BASE_SPEED,
                &tuning,
                &mut state,
                &mut counters,
                &mut r,
                DT,
            );
        }
        assert_eq!(counters.catch_attempts, 1);
        assert!(predator.energy() < 100.0, "escalation must cost energy");
    }

    #[test]
    fn attempts_count_each_threshold_crossing() {
        let tuning = TuningConfig::default();
        let mut prey = ai(Role::Prey, 400.0, 300.0);
        let mut state = PolicyState::default();
        let mut counters = AttemptCounters::default();
        let mut r = rng();
        for close in [true, false, true, false, true] {
            let px = if close { 390.0 } else { 700.0 };
            let _ = steer(
                &mut prey,
                Vec2::new(px, 300.0),
                BASE_SPEED,
                &tuning,
                &mut state,
                &mut counters,
                &mut r,
                DT,
            );
        }
        assert_eq!(counters.escape_attempts, 3);
    }

    #[test]
    fn energy_regenerates_beyond_pressure_range() {
        let tuning = TuningConfig::default();
        let mut prey = ai(Role::Prey, 100.0, 100.0);
        prey.spend_energy(50.0);
        let before = prey.energy();
        let mut state = PolicyState::default();
        let mut counters = AttemptCounters::default();
        let _ = steer(
            &mut prey,
            Vec2::new(700.0, 500.0),
            BASE_SPEED,
            &tuning,
            &mut state,
            &mut counters,
            &mut rng(),
            DT,
        );
        assert!(prey.energy() > before);
    }
}
