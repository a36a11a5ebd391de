//! Scripted participant for headless sessions.
//!
//! Stands in for a human at the keyboard: a predator chases, a prey
//! flees with a pull toward the arena center so it never wedges itself
//! into a corner. The script only ever talks to the session through
//! the same key events a browser would deliver.

use reflex_engine::session::Session;
use reflex_types::{Role, Vec2};

/// Keys the script may hold between ticks.
const DIRECTION_KEYS: [&str; 4] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight"];

/// Minimum normalized component before a directional key is pressed.
const DEADZONE: f64 = 0.2;

/// Boost only above this energy so the script never runs itself dry.
const BOOST_ENERGY_FLOOR: f64 = 30.0;

/// Drives the participant one tick's worth of key events.
#[derive(Debug, Default)]
pub struct ScriptedPilot;

impl ScriptedPilot {
    /// A pilot with no keys held.
    pub const fn new() -> Self {
        Self
    }

    /// Update the held keys from the current entity positions.
    pub fn drive(&self, session: &mut Session) {
        let (Some(me), Some(opponent)) = (session.participant(), session.opponent()) else {
            return;
        };
        let role = me.role;
        let my_pos = me.position;
        let energy = me.energy();
        let opp_pos = opponent.position;
        let arena = session.config().arena;
        let distance = my_pos.distance(opp_pos);

        let desired = match role {
            Role::Predator => Vec2::new(opp_pos.x - my_pos.x, opp_pos.y - my_pos.y).normalized(),
            Role::Prey => {
                // Flee, but keep a pull toward the center so walls
                // stay escapable.
                let away = Vec2::new(my_pos.x - opp_pos.x, my_pos.y - opp_pos.y).normalized();
                let center = Vec2::new(
                    arena.width / 2.0 - my_pos.x,
                    arena.height / 2.0 - my_pos.y,
                )
                .normalized();
                away.add(center.scale(0.6)).normalized()
            }
        };

        for key in DIRECTION_KEYS {
            session.key_up(key);
        }
        if desired.x > DEADZONE {
            session.key_down("ArrowRight");
        } else if desired.x < -DEADZONE {
            session.key_down("ArrowLeft");
        }
        if desired.y > DEADZONE {
            session.key_down("ArrowDown");
        } else if desired.y < -DEADZONE {
            session.key_down("ArrowUp");
        }

        let want_boost = energy > BOOST_ENERGY_FLOOR
            && match role {
                Role::Predator => true,
                Role::Prey => distance < 120.0,
            };
        if want_boost {
            session.key_down("Shift");
        } else {
            session.key_up("Shift");
        }
    }
}
