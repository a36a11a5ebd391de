//! Per-tick physics integration for both entities.
//!
//! The integrator turns an intent (participant) or a policy velocity
//! (AI) into a clamped position update plus the energy bookkeeping the
//! movement implies. Guarantees on every call: the position never
//! leaves the arena interior `[size, dim - size]` on either axis, and
//! energy never leaves [0, 100].

use reflex_types::Vec2;

use crate::config::{ArenaConfig, MovementConfig};
use crate::entity::Entity;
use crate::input::Intent;

/// Integrate one tick of participant movement from an input intent.
///
/// `speed = base_speed * (boost ? boost_multiplier : 1)` in pixels per
/// second per speed unit; the boost engages only while the entity has
/// energy left. Moving drains `energy_decay_rate * dt` (plus the fixed
/// per-tick boost cost while boosting); idling regenerates at half the
/// decay rate.
pub fn integrate_intent(
    entity: &mut Entity,
    intent: &Intent,
    movement: &MovementConfig,
    arena: &ArenaConfig,
    dt: f64,
) {
    let boost_active = intent.boost_held && entity.energy() > 0.0;
    let multiplier = if boost_active {
        movement.boost_multiplier
    } else {
        1.0
    };
    let speed = movement.base_speed * multiplier * SPEED_SCALE;
    let velocity = intent.direction.scale(speed);

    apply_velocity(entity, velocity, arena, dt);

    if intent.is_moving() {
        let mut cost = movement.energy_decay_rate * dt;
        if boost_active {
            cost += movement.boost_tick_cost;
        }
        entity.spend_energy(cost);
    } else {
        entity.regain_energy(movement.energy_decay_rate * dt * 0.5);
    }
}

/// Apply a per-second velocity to an entity for `dt` seconds, clamping
/// the resulting position to the arena interior and extending the trail.
pub fn apply_velocity(entity: &mut Entity, velocity: Vec2, arena: &ArenaConfig, dt: f64) {
    entity.velocity = velocity;
    let raw = entity.position.add(velocity.scale(dt));
    let clamped = clamp_to_arena(raw, entity.size, arena);
    entity.move_to(clamped);
}

/// Clamp a position so a circle of radius `size` stays inside the arena.
pub fn clamp_to_arena(position: Vec2, size: f64, arena: &ArenaConfig) -> Vec2 {
    Vec2::new(
        position.x.clamp(size, arena.width - size),
        position.y.clamp(size, arena.height - size),
    )
}

/// Pixels per second contributed by one unit of the base-speed slider.
///
/// The front-end moved entities by `base_speed` pixels per 1/60 s frame;
/// expressed per second that is a factor of 60.
pub const SPEED_SCALE: f64 = 60.0;
