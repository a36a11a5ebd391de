//! Proximity stimulus trigger with cooldown suppression.
//!
//! After each tick's position update the session asks the trigger
//! whether a stimulus should fire for the current distance. A firing
//! requires stimulation to be enabled, the distance to be inside the
//! trigger threshold, and the cooldown window since the previous firing
//! to have fully elapsed -- no second stimulus can fire inside the
//! window no matter how many ticks occur within it. Time is the
//! session's accumulated active-play time, never wall time, so pausing
//! freezes the cooldown too.

use crate::config::StimulationConfig;

/// A stimulus that fired this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimulusFire {
    /// Distance between the entities at firing time, in pixels.
    pub distance: f64,
    /// Health decrement applied to the participant.
    pub intensity: f64,
}

/// Cooldown-gated proximity trigger, reset at every round start.
#[derive(Debug, Clone)]
pub struct StimulusTrigger {
    config: StimulationConfig,
    last_fired_at: Option<f64>,
    visible_until: Option<f64>,
}

impl StimulusTrigger {
    /// Create a trigger for one round.
    pub const fn new(config: StimulationConfig) -> Self {
        Self {
            config,
            last_fired_at: None,
            visible_until: None,
        }
    }

    /// Evaluate the trigger at `now` seconds of active play. Returns
    /// the firing, if one occurred.
    pub fn tick(&mut self, now: f64, distance: f64) -> Option<StimulusFire> {
        if !self.config.enabled || distance >= self.config.threshold {
            return None;
        }
        let cooled_down = self
            .last_fired_at
            .is_none_or(|t| now - t >= self.config.cooldown_s);
        if !cooled_down {
            return None;
        }
        self.last_fired_at = Some(now);
        self.visible_until = Some(now + self.config.visible_s);
        Some(StimulusFire {
            distance,
            intensity: self.config.intensity,
        })
    }

    /// Whether the stimulation indicator is visible at `now`. The flag
    /// auto-clears once the visibility window elapses.
    pub fn visible(&self, now: f64) -> bool {
        self.visible_until.is_some_and(|until| now < until)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StimulationConfig {
        StimulationConfig::default()
    }

    #[test]
    fn fires_inside_threshold() {
        let mut trigger = StimulusTrigger::new(config());
        let fire = trigger.tick(0.5, 60.0);
        assert!(fire.is_some());
        let fire = fire.unwrap();
        assert!((fire.distance - 60.0).abs() < f64::EPSILON);
        assert!((fire.intensity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn does_not_fire_outside_threshold() {
        let mut trigger = StimulusTrigger::new(config());
        assert!(trigger.tick(0.5, 200.0).is_none());
    }

    #[test]
    fn does_not_fire_when_disabled() {
        let mut cfg = config();
        cfg.enabled = false;
        let mut trigger = StimulusTrigger::new(cfg);
        assert!(trigger.tick(0.5, 10.0).is_none());
    }

    #[test]
    fn cooldown_suppresses_consecutive_firings() {
        let mut trigger = StimulusTrigger::new(config());
        assert!(trigger.tick(0.0, 60.0).is_some());

        // Proximity holds continuously across many ticks; nothing may
        // fire until 1.5 s have elapsed.
        let dt = 1.0 / 60.0;
        let mut now = 0.0;
        let mut fired_at = Vec::new();
        for _ in 0..240 {
            now += dt;
            if trigger.tick(now, 60.0).is_some() {
                fired_at.push(now);
            }
        }
        for t in &fired_at {
            assert!(*t >= 1.5, "stimulus fired at {t}, inside the cooldown");
        }
        assert_eq!(fired_at.len(), 2, "4 s of proximity allows 2 more firings");
    }

    #[test]
    fn visibility_auto_clears() {
        let mut trigger = StimulusTrigger::new(config());
        let _ = trigger.tick(1.0, 60.0);
        assert!(trigger.visible(1.0));
        assert!(trigger.visible(1.7));
        assert!(!trigger.visible(1.9));
    }
}
