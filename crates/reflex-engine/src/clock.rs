//! Simulated-time clocks for rounds.
//!
//! All timing in the engine is driven by the `dt` the caller feeds in;
//! nothing here reads wall time. Pausing is therefore trivial: a paused
//! session simply stops advancing its clocks, and no time is lost or
//! gained across the pause (the remaining countdown is preserved
//! exactly).

/// A whole-second countdown driven by fractional tick deltas.
///
/// The remaining value only ever changes in whole-second steps, which
/// matches a 1 Hz on-screen countdown; sub-second progress accumulates
/// internally.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    remaining_s: u32,
    frac: f64,
}

impl Countdown {
    /// Start a countdown from `seconds`.
    pub const fn new(seconds: u32) -> Self {
        Self {
            remaining_s: seconds,
            frac: 0.0,
        }
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.frac += dt.max(0.0);
        while self.frac >= 1.0 && self.remaining_s > 0 {
            self.frac -= 1.0;
            self.remaining_s = self.remaining_s.saturating_sub(1);
        }
    }

    /// Whole seconds left.
    pub const fn remaining_s(&self) -> u32 {
        self.remaining_s
    }

    /// True once the countdown has fully elapsed.
    pub const fn finished(&self) -> bool {
        self.remaining_s == 0
    }
}

/// Accumulated active-play time for one round.
///
/// Serves as the time base for stimulus cooldowns, reaction times, and
/// the round duration metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundClock {
    elapsed_s: f64,
}

impl RoundClock {
    /// A clock at zero.
    pub const fn new() -> Self {
        Self { elapsed_s: 0.0 }
    }

    /// Advance by `dt` seconds of active play.
    pub fn advance(&mut self, dt: f64) {
        self.elapsed_s += dt.max(0.0);
    }

    /// Seconds of active play so far.
    pub const fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn countdown_steps_in_whole_seconds() {
        let mut c = Countdown::new(3);
        let dt = 1.0 / 60.0;
        // 59 ticks: still 3 s on the clock.
        for _ in 0..59 {
            c.advance(dt);
        }
        assert_eq!(c.remaining_s(), 3);
        // Two more ticks put the accumulator safely past one second.
        c.advance(dt);
        c.advance(dt);
        assert_eq!(c.remaining_s(), 2);
    }

    #[test]
    fn countdown_finishes_after_full_duration() {
        let mut c = Countdown::new(3);
        let dt = 1.0 / 60.0;
        for _ in 0..185 {
            c.advance(dt);
        }
        assert!(c.finished());
        assert_eq!(c.remaining_s(), 0);
    }

    #[test]
    fn countdown_absorbs_large_deltas() {
        let mut c = Countdown::new(5);
        c.advance(3.25);
        assert_eq!(c.remaining_s(), 2);
        c.advance(10.0);
        assert!(c.finished());
    }

    #[test]
    fn countdown_ignores_negative_deltas() {
        let mut c = Countdown::new(2);
        c.advance(-5.0);
        assert_eq!(c.remaining_s(), 2);
    }

    #[test]
    fn round_clock_accumulates() {
        let mut clock = RoundClock::new();
        for _ in 0..120 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.elapsed_s() - 2.0).abs() < 1e-9);
    }
}
