//! Speed-duel experiment: a traffic merge negotiated by speed choices.
//!
//! Two cars race toward a finish line on lanes that merge into a single
//! center lane partway up the track. The participant picks one of four
//! discrete speed levels per round; the opponent is driven either by a
//! built-in strategy or by externally supplied choices (the decision
//! oracle). Rounds are scored 10/5/0 by progress at the first finish.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Countdown;

/// The four selectable speed levels, slow to maximum, in track units
/// per second.
pub const SPEED_LEVELS: [f64; 4] = [20.0, 30.0, 40.0, 50.0];

/// Largest speed change per second when accelerating toward a target.
const ACCEL_CAP: f64 = 20.0;
/// Start-to-finish distance in track units.
const TRACK_LENGTH: f64 = 500.0;
/// Vertical position below which the side lanes begin merging.
const MERGE_Y: f64 = 300.0;
/// Horizontal position of the merged center lane.
const MERGE_X: f64 = 400.0;
/// Seconds the round-end overlay stays up before the next round.
const ROUND_END_S: f64 = 3.0;
/// Speeds at or above this count as high-speed choices in the summary.
const HIGH_SPEED_CUTOFF: f64 = 40.0;

/// A discrete speed level bound to the digit keys 2-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedLevel {
    /// 20 units/s (key `2`).
    Slow,
    /// 30 units/s (key `3`).
    Medium,
    /// 40 units/s (key `4`).
    Fast,
    /// 50 units/s (key `5`).
    Maximum,
}

impl SpeedLevel {
    /// Map a digit key to a level. Other keys are ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "2" => Some(Self::Slow),
            "3" => Some(Self::Medium),
            "4" => Some(Self::Fast),
            "5" => Some(Self::Maximum),
            _ => None,
        }
    }

    /// The level's speed in track units per second.
    pub const fn speed(self) -> f64 {
        match self {
            Self::Slow => 20.0,
            Self::Medium => 30.0,
            Self::Fast => 40.0,
            Self::Maximum => 50.0,
        }
    }
}

/// Which lane a car currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lane {
    /// Left approach lane.
    Left,
    /// Right approach lane.
    Right,
    /// The merged center lane.
    Center,
}

/// One car's kinematic state on the track.
#[derive(Debug, Clone, Copy)]
pub struct DuelCar {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position; the car drives toward smaller `y`.
    pub y: f64,
    /// Current speed in track units per second.
    pub speed: f64,
    /// Speed the car accelerates toward.
    pub target_speed: f64,
    /// Current lane.
    pub lane: Lane,
    /// Progress toward the finish, 0-100.
    pub progress: f64,
}

impl DuelCar {
    /// A stationary car at the start position of its lane.
    const fn new(x: f64, lane: Lane) -> Self {
        Self {
            x,
            y: 500.0,
            speed: 0.0,
            target_speed: 0.0,
            lane,
            progress: 0.0,
        }
    }

    /// Advance the car by `dt` seconds: accelerate toward the target
    /// (rate-capped), move up the track, and merge toward the center
    /// lane once past the merge point.
    pub fn update(&mut self, dt: f64) {
        let diff = self.target_speed - self.speed;
        self.speed = diff.abs().min(ACCEL_CAP).copysign(diff).mul_add(dt, self.speed);

        self.y = self.speed.mul_add(-dt, self.y);
        self.progress = ((TRACK_LENGTH - self.y) / TRACK_LENGTH * 100.0).clamp(0.0, 100.0);

        if self.y <= MERGE_Y && self.lane != Lane::Center {
            let merge_step = (self.x - MERGE_X).abs() * (self.y / MERGE_Y) * dt;
            match self.lane {
                Lane::Left => {
                    self.x = (self.x + merge_step).min(MERGE_X);
                    if self.x >= MERGE_X {
                        self.lane = Lane::Center;
                    }
                }
                Lane::Right => {
                    self.x = (self.x - merge_step).max(MERGE_X);
                    if self.x <= MERGE_X {
                        self.lane = Lane::Center;
                    }
                }
                Lane::Center => {}
            }
        }
    }
}

/// How the opponent car picks its target speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentPolicy {
    /// Prefers the two fastest levels.
    Aggressive,
    /// Prefers the two slowest levels.
    Cautious,
    /// Shadows the player's speed with a small offset.
    Adaptive,
    /// Uniform over all levels.
    Random,
    /// Driven by externally applied choices (the decision oracle);
    /// the built-in strategies are bypassed.
    External,
}

/// How a round was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelWinner {
    /// The participant led at the finish.
    Player,
    /// The opponent led at the finish.
    Opponent,
    /// Equal progress at the finish.
    Tie,
}

/// Record of one finished duel round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuelRound {
    /// 1-based round index.
    pub round: u32,
    /// Player speed at the finish.
    pub player_speed: f64,
    /// Opponent speed at the finish.
    pub opponent_speed: f64,
    /// Points the player earned this round (10/5/0).
    pub player_points: u32,
    /// Points the opponent earned this round.
    pub opponent_points: u32,
    /// Who won.
    pub winner: DuelWinner,
    /// Reaction time for the round's first speed choice, in
    /// milliseconds; 0 when the player never chose.
    pub reaction_time_ms: f64,
}

/// Summary over a completed duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelResults {
    /// The player's total score.
    pub score: u32,
    /// The opponent's total score.
    pub opponent_score: u32,
    /// Rounds played.
    pub total_rounds: u32,
    /// Fraction of rounds the player won outright.
    pub win_rate: f64,
    /// Mean of the player's chosen speeds; 0 with no choices.
    pub average_speed: f64,
    /// Fraction of choices at or above 40 units/s.
    pub high_speed_rate: f64,
    /// Fraction of choices below 40 units/s.
    pub low_speed_rate: f64,
    /// Reaction times per choice, milliseconds.
    pub reaction_times_ms: Vec<f64>,
    /// Every speed the player chose, in order.
    pub speed_choices: Vec<f64>,
    /// Per-round records.
    pub rounds: Vec<DuelRound>,
}

/// The speed-duel state machine: countdown, race, round-end overlay,
/// repeated for the configured number of rounds.
pub struct SpeedDuel {
    running: bool,
    complete: bool,
    round: u32,
    total_rounds: u32,
    player_score: u32,
    opponent_score: u32,
    countdown: Countdown,
    round_ended: bool,
    round_winner: Option<DuelWinner>,
    round_end_timer: f64,
    player: DuelCar,
    opponent: DuelCar,
    policy: OpponentPolicy,
    fixed_policy: Option<OpponentPolicy>,
    elapsed_s: f64,
    round_reaction_ms: Option<f64>,
    reaction_times_ms: Vec<f64>,
    speed_choices: Vec<f64>,
    rounds: Vec<DuelRound>,
    trials: u32,
    rng: StdRng,
}

impl SpeedDuel {
    /// Create a duel of `total_rounds` rounds. With `policy = None`, a
    /// random built-in strategy is drawn per round; otherwise the given
    /// policy is used for every round.
    pub fn new(total_rounds: u32, policy: Option<OpponentPolicy>, mut rng: StdRng) -> Self {
        let initial = policy.unwrap_or_else(|| draw_strategy(&mut rng));
        Self {
            running: false,
            complete: false,
            round: 1,
            total_rounds: total_rounds.max(1),
            player_score: 0,
            opponent_score: 0,
            countdown: Countdown::new(3),
            round_ended: false,
            round_winner: None,
            round_end_timer: 0.0,
            player: DuelCar::new(200.0, Lane::Left),
            opponent: DuelCar::new(600.0, Lane::Right),
            policy: initial,
            fixed_policy: policy,
            elapsed_s: 0.0,
            round_reaction_ms: None,
            reaction_times_ms: Vec::new(),
            speed_choices: Vec::new(),
            rounds: Vec::new(),
            trials: 0,
            rng,
        }
    }

    /// Start (or resume) the duel.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Pause the duel; `update` becomes a no-op.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Whether every round has been played.
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// 1-based index of the current round.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Rounds in the duel.
    pub const fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// The player's running score.
    pub const fn player_score(&self) -> u32 {
        self.player_score
    }

    /// The opponent's running score.
    pub const fn opponent_score(&self) -> u32 {
        self.opponent_score
    }

    /// Every speed the player has chosen so far, in order.
    pub fn choice_history(&self) -> &[f64] {
        &self.speed_choices
    }

    /// Number of externally applied opponent choices so far.
    pub const fn trials(&self) -> u32 {
        self.trials
    }

    /// Whether the current round is waiting in the end overlay.
    pub const fn round_ended(&self) -> bool {
        self.round_ended
    }

    /// The player car's state.
    pub const fn player(&self) -> &DuelCar {
        &self.player
    }

    /// The opponent car's state.
    pub const fn opponent(&self) -> &DuelCar {
        &self.opponent
    }

    /// The winner of the last finished round, while the overlay is up.
    pub const fn round_winner(&self) -> Option<DuelWinner> {
        self.round_winner
    }

    /// Record the player's speed choice for this round. Ignored while
    /// paused; reaction time is captured only during active racing.
    pub fn choose_speed(&mut self, level: SpeedLevel) {
        if !self.running {
            return;
        }
        self.player.target_speed = level.speed();
        self.speed_choices.push(level.speed());
        if self.countdown.finished() && !self.round_ended {
            let reaction = self.elapsed_s * 1000.0;
            self.reaction_times_ms.push(reaction);
            if self.round_reaction_ms.is_none() {
                self.round_reaction_ms = Some(reaction);
            }
        }
    }

    /// Apply an externally decided opponent speed (0-based index into
    /// [`SPEED_LEVELS`]). Every applied choice advances the trial
    /// counter by exactly one; an out-of-range index is ignored and
    /// does not count.
    pub fn apply_opponent_choice(&mut self, index: usize) -> bool {
        let Some(speed) = SPEED_LEVELS.get(index) else {
            return false;
        };
        self.opponent.target_speed = *speed;
        self.trials = self.trials.saturating_add(1);
        debug!(trial = self.trials, speed, "external opponent choice applied");
        true
    }

    /// Advance the duel by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if !self.running || self.complete {
            return;
        }
        if self.round_ended {
            self.round_end_timer -= dt;
            if self.round_end_timer <= 0.0 {
                self.start_next_round();
            }
            return;
        }
        if !self.countdown.finished() {
            self.countdown.advance(dt);
            return;
        }

        self.elapsed_s += dt;
        self.player.update(dt);
        self.opponent.update(dt);
        self.update_opponent(dt);

        if self.player.progress >= 100.0 || self.opponent.progress >= 100.0 {
            self.end_round();
        }
    }

    /// The summary; available once the duel is complete.
    pub fn results(&self) -> Option<DuelResults> {
        if !self.complete {
            return None;
        }
        let choices = &self.speed_choices;
        let choice_count = u32::try_from(choices.len()).unwrap_or(u32::MAX);
        let wins = self
            .rounds
            .iter()
            .filter(|r| r.winner == DuelWinner::Player)
            .count();
        let wins = u32::try_from(wins).unwrap_or(u32::MAX);
        let high = choices.iter().filter(|s| **s >= HIGH_SPEED_CUTOFF).count();
        let high = u32::try_from(high).unwrap_or(u32::MAX);
        let (average_speed, high_speed_rate, low_speed_rate) = if choice_count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let total: f64 = choices.iter().sum();
            let n = f64::from(choice_count);
            let high_rate = f64::from(high) / n;
            (total / n, high_rate, 1.0 - high_rate)
        };
        Some(DuelResults {
            score: self.player_score,
            opponent_score: self.opponent_score,
            total_rounds: self.total_rounds,
            win_rate: f64::from(wins) / f64::from(self.total_rounds),
            average_speed,
            high_speed_rate,
            low_speed_rate,
            reaction_times_ms: self.reaction_times_ms.clone(),
            speed_choices: self.speed_choices.clone(),
            rounds: self.rounds.clone(),
        })
    }

    /// Pick the opponent's target speed per the active policy. The
    /// external policy never sets a speed here.
    fn update_opponent(&mut self, _dt: f64) {
        let target = match self.policy {
            OpponentPolicy::Aggressive => {
                if self.rng.random_bool(0.5) {
                    SpeedLevel::Fast.speed()
                } else {
                    SpeedLevel::Maximum.speed()
                }
            }
            OpponentPolicy::Cautious => {
                if self.rng.random_bool(0.5) {
                    SpeedLevel::Slow.speed()
                } else {
                    SpeedLevel::Medium.speed()
                }
            }
            OpponentPolicy::Adaptive => {
                if self.player.speed > 35.0 {
                    self.player.speed + self.rng.random_range(-5.0..=10.0)
                } else {
                    self.player.speed + self.rng.random_range(-10.0..=5.0)
                }
            }
            OpponentPolicy::Random => {
                let pick = self.rng.random_range(0..SPEED_LEVELS.len());
                SPEED_LEVELS.get(pick).copied().unwrap_or(30.0)
            }
            OpponentPolicy::External => return,
        };
        self.opponent.target_speed = target;
    }

    fn end_round(&mut self) {
        let winner = if self.player.progress > self.opponent.progress {
            DuelWinner::Player
        } else if self.opponent.progress > self.player.progress {
            DuelWinner::Opponent
        } else {
            DuelWinner::Tie
        };
        let (player_points, opponent_points): (u32, u32) = match winner {
            DuelWinner::Player => (10, 0),
            DuelWinner::Opponent => (0, 10),
            DuelWinner::Tie => (5, 5),
        };
        self.player_score = self.player_score.saturating_add(player_points);
        self.opponent_score = self.opponent_score.saturating_add(opponent_points);
        self.rounds.push(DuelRound {
            round: self.round,
            player_speed: self.player.speed,
            opponent_speed: self.opponent.speed,
            player_points,
            opponent_points,
            winner,
            reaction_time_ms: self.round_reaction_ms.unwrap_or(0.0),
        });
        info!(round = self.round, winner = ?winner, "duel round ended");
        self.round_ended = true;
        self.round_winner = Some(winner);
        self.round_end_timer = ROUND_END_S;
    }

    fn start_next_round(&mut self) {
        self.round = self.round.saturating_add(1);
        if self.round > self.total_rounds {
            self.complete = true;
            self.running = false;
            info!(
                score = self.player_score,
                opponent_score = self.opponent_score,
                "duel complete"
            );
            return;
        }
        self.player = DuelCar::new(200.0, Lane::Left);
        self.opponent = DuelCar::new(600.0, Lane::Right);
        self.policy = self
            .fixed_policy
            .unwrap_or_else(|| draw_strategy(&mut self.rng));
        self.round_ended = false;
        self.round_winner = None;
        self.round_reaction_ms = None;
        self.countdown = Countdown::new(3);
        self.elapsed_s = 0.0;
    }
}

fn draw_strategy(rng: &mut StdRng) -> OpponentPolicy {
    match rng.random_range(0..4_u8) {
        0 => OpponentPolicy::Aggressive,
        1 => OpponentPolicy::Cautious,
        2 => OpponentPolicy::Adaptive,
        _ => OpponentPolicy::Random,
    }
}
