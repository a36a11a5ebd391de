//! Entity state for the two pursuit agents.
//!
//! Each round creates two entities (participant and AI) with a role,
//! a collision radius, and clamped vitals. Health and energy live in
//! [0, 100] at every tick; every mutation path clamps on write so the
//! invariant can never be violated by a caller.

use std::collections::VecDeque;

use reflex_types::{Role, Vec2};

/// Upper bound for both vitals.
const VITAL_MAX: f64 = 100.0;

/// One pursuit agent's mutable per-round state.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Current position in arena coordinates.
    pub position: Vec2,
    /// Last-computed displacement per second.
    pub velocity: Vec2,
    /// Collision radius; larger for the predator role.
    pub size: f64,
    /// The role held this round.
    pub role: Role,
    health: f64,
    energy: f64,
    trail: VecDeque<Vec2>,
    trail_capacity: usize,
    path_length: f64,
    energy_consumed: f64,
}

impl Entity {
    /// Create an entity at a spawn position with full vitals.
    pub fn new(role: Role, position: Vec2, size: f64, trail_capacity: usize) -> Self {
        let mut trail = VecDeque::with_capacity(trail_capacity.min(1024));
        trail.push_back(position);
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            role,
            health: VITAL_MAX,
            energy: VITAL_MAX,
            trail,
            trail_capacity,
            path_length: 0.0,
            energy_consumed: 0.0,
        }
    }

    /// Current health in [0, 100].
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Current energy in [0, 100].
    pub const fn energy(&self) -> f64 {
        self.energy
    }

    /// Total distance traveled this round, in pixels.
    pub const fn path_length(&self) -> f64 {
        self.path_length
    }

    /// Total energy spent this round (regeneration does not refund it).
    pub const fn energy_consumed(&self) -> f64 {
        self.energy_consumed
    }

    /// The recent movement trail, oldest first.
    pub const fn trail(&self) -> &VecDeque<Vec2> {
        &self.trail
    }

    /// Reduce health by `amount`, clamped at zero. Health is a stress
    /// proxy, not a fail condition: reaching zero does not end a round.
    pub fn apply_damage(&mut self, amount: f64) {
        self.health = (self.health - amount.max(0.0)).clamp(0.0, VITAL_MAX);
    }

    /// Spend energy, clamped at zero, and book it as consumed.
    pub fn spend_energy(&mut self, amount: f64) {
        let amount = amount.max(0.0);
        let spent = amount.min(self.energy);
        self.energy = (self.energy - amount).clamp(0.0, VITAL_MAX);
        self.energy_consumed += spent;
    }

    /// Regain energy, clamped at the cap.
    pub fn regain_energy(&mut self, amount: f64) {
        self.energy = (self.energy + amount.max(0.0)).clamp(0.0, VITAL_MAX);
    }

    /// Move the entity to a new (already arena-clamped) position,
    /// extending the trail and the path-length odometer.
    ///
    /// The trail is bounded: once `trail_capacity` samples are held the
    /// oldest is dropped. Path length is accumulated incrementally so
    /// the bound never affects metrics.
    pub fn move_to(&mut self, position: Vec2) {
        self.path_length += self.position.distance(position);
        self.position = position;
        if self.trail.len() >= self.trail_capacity {
            self.trail.pop_front();
        }
        self.trail.push_back(position);
    }
}
