//! Input sampling: held keys to a normalized movement intent.
//!
//! The sampler is purely reactive: key-down and key-up events mutate a
//! held-key set, and `intent()` folds the set into a movement vector on
//! demand. Diagonal movement is scaled by `1/sqrt(2)` so it is never
//! faster than axis-aligned movement. Whether the sampler accepts
//! events at all is controlled by the session (input is ignored while
//! a round is paused or not yet active).

use std::collections::BTreeSet;

use reflex_types::Vec2;

/// A normalized key token. Arrow keys and WASD map to the same tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyToken {
    /// Move up (`ArrowUp` / `w`).
    Up,
    /// Move down (`ArrowDown` / `s`).
    Down,
    /// Move left (`ArrowLeft` / `a`).
    Left,
    /// Move right (`ArrowRight` / `d`).
    Right,
    /// Request a speed boost (`Shift`).
    Boost,
}

impl KeyToken {
    /// Map a DOM-style key name to a token. Unknown keys are ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Self::Up),
            "ArrowDown" | "s" | "S" => Some(Self::Down),
            "ArrowLeft" | "a" | "A" => Some(Self::Left),
            "ArrowRight" | "d" | "D" => Some(Self::Right),
            "Shift" => Some(Self::Boost),
            _ => None,
        }
    }
}

/// The movement intent derived from the held-key set for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intent {
    /// Unit-scaled movement direction (zero when no directional key is
    /// held; `1/sqrt(2)` components on diagonals).
    pub direction: Vec2,
    /// Whether the boost key is held. The integrator activates the
    /// boost only while the entity has energy left.
    pub boost_held: bool,
}

impl Intent {
    /// An idle intent (no movement, no boost).
    pub const IDLE: Self = Self {
        direction: Vec2::ZERO,
        boost_held: false,
    };

    /// True when any directional component is non-zero.
    pub fn is_moving(&self) -> bool {
        self.direction.length() > f64::EPSILON
    }
}

/// Tracks which keys are currently held and produces per-tick intents.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    held: BTreeSet<KeyToken>,
    enabled: bool,
}

impl InputSampler {
    /// Create a sampler; starts disabled until a round goes active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable event intake. While disabled, key events are
    /// dropped and the held set is cleared so stale keys cannot leak
    /// into the next round.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.held.clear();
        }
    }

    /// Record a key press.
    pub fn key_down(&mut self, token: KeyToken) {
        if self.enabled {
            self.held.insert(token);
        }
    }

    /// Record a key release.
    pub fn key_up(&mut self, token: KeyToken) {
        self.held.remove(&token);
    }

    /// Fold the held set into a movement intent.
    pub fn intent(&self) -> Intent {
        let mut x: f64 = 0.0;
        let mut y: f64 = 0.0;
        if self.held.contains(&KeyToken::Left) {
            x -= 1.0;
        }
        if self.held.contains(&KeyToken::Right) {
            x += 1.0;
        }
        if self.held.contains(&KeyToken::Up) {
            y -= 1.0;
        }
        if self.held.contains(&KeyToken::Down) {
            y += 1.0;
        }

        // Diagonals would otherwise move sqrt(2) times faster.
        let direction = if x.abs() > f64::EPSILON && y.abs() > f64::EPSILON {
            let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
            Vec2::new(x * inv_sqrt2, y * inv_sqrt2)
        } else {
            Vec2::new(x, y)
        };

        Intent {
            direction,
            boost_held: self.held.contains(&KeyToken::Boost),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sampler() -> InputSampler {
        let mut s = InputSampler::new();
        s.set_enabled(true);
        s
    }

    #[test]
    fn single_axis_intent_is_unit_length() {
        let mut s = sampler();
        s.key_down(KeyToken::Right);
        let intent = s.intent();
        assert!((intent.direction.length() - 1.0).abs() < 1e-12);
        assert!(intent.direction.x > 0.0);
    }

    #[test]
    fn diagonal_intent_is_normalized() {
        let mut s = sampler();
        s.key_down(KeyToken::Up);
        s.key_down(KeyToken::Left);
        let intent = s.intent();
        assert!((intent.direction.length() - 1.0).abs() < 1e-12);
        assert!((intent.direction.x.abs() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut s = sampler();
        s.key_down(KeyToken::Left);
        s.key_down(KeyToken::Right);
        assert!(!s.intent().is_moving());
    }

    #[test]
    fn key_up_removes_contribution() {
        let mut s = sampler();
        s.key_down(KeyToken::Down);
        s.key_up(KeyToken::Down);
        assert!(!s.intent().is_moving());
    }

    #[test]
    fn boost_flag_follows_shift() {
        let mut s = sampler();
        assert!(!s.intent().boost_held);
        s.key_down(KeyToken::Boost);
        assert!(s.intent().boost_held);
    }

    #[test]
    fn disabled_sampler_drops_events_and_clears_held_keys() {
        let mut s = sampler();
        s.key_down(KeyToken::Right);
        s.set_enabled(false);
        assert!(!s.intent().is_moving(), "disable must clear held keys");
        s.key_down(KeyToken::Left);
        assert!(!s.intent().is_moving(), "disabled sampler must drop events");
    }

    #[test]
    fn dom_key_names_map_to_tokens() {
        assert_eq!(KeyToken::from_key("ArrowUp"), Some(KeyToken::Up));
        assert_eq!(KeyToken::from_key("w"), Some(KeyToken::Up));
        assert_eq!(KeyToken::from_key("Shift"), Some(KeyToken::Boost));
        assert_eq!(KeyToken::from_key("Escape"), None);
    }
}
