//! Configuration loading and typed config structures for the engine.
//!
//! The canonical configuration is a YAML file mirrored by the structs
//! below. Every field has a default matching the values the browser
//! front-end ships with, so an empty file (or no file) yields a playable
//! session. Out-of-range numeric settings are clamped on load rather
//! than rejected: the front-end's range sliders are the only validation
//! layer, and the engine mirrors that behavior.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Arena dimensions.
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Round timing and count.
    #[serde(default)]
    pub rounds: RoundConfig,

    /// Movement and energy parameters.
    #[serde(default)]
    pub movement: MovementConfig,

    /// Proximity stimulus parameters.
    #[serde(default)]
    pub stimulation: StimulationConfig,

    /// Behavioral tunables for the AI policy.
    ///
    /// These were informally tuned for feel in the original front-end,
    /// so they are exposed as configuration rather than hard-coded.
    #[serde(default)]
    pub tuning: TuningConfig,
}

impl SessionConfig {
    /// Load configuration from a YAML file at the given path, applying
    /// range clamps to every bounded field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying range clamps.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.clamp_ranges();
        Ok(config)
    }

    /// Clamp every user-adjustable field to its slider range.
    fn clamp_ranges(&mut self) {
        self.rounds.duration_s = self.rounds.duration_s.clamp(15.0, 60.0);
        self.movement.base_speed = self.movement.base_speed.clamp(2.0, 8.0);
        self.stimulation.intensity = self.stimulation.intensity.clamp(1.0, 10.0);
        self.stimulation.threshold = self.stimulation.threshold.clamp(50.0, 150.0);
    }
}

/// Arena dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Arena width.
    #[serde(default = "default_arena_width")]
    pub width: f64,
    /// Arena height.
    #[serde(default = "default_arena_height")]
    pub height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: default_arena_width(),
            height: default_arena_height(),
        }
    }
}

/// Round timing and count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Round duration in seconds (slider range 15-60).
    #[serde(default = "default_round_duration")]
    pub duration_s: f64,
    /// Total number of rounds per session.
    #[serde(default = "default_total_rounds")]
    pub total_rounds: u32,
    /// Pre-round countdown in whole seconds (displayed at 1 Hz).
    #[serde(default = "default_countdown")]
    pub countdown_s: u32,
    /// Post-round transition overlay duration in whole seconds.
    #[serde(default = "default_transition")]
    pub transition_s: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_s: default_round_duration(),
            total_rounds: default_total_rounds(),
            countdown_s: default_countdown(),
            transition_s: default_transition(),
        }
    }
}

/// Movement speed, entity sizes, and the energy model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Base speed in pixels per second per speed unit (slider range 2-8).
    #[serde(default = "default_base_speed")]
    pub base_speed: f64,
    /// Collision radius for the predator role (the larger entity).
    #[serde(default = "default_predator_size")]
    pub predator_size: f64,
    /// Collision radius for the prey role.
    #[serde(default = "default_prey_size")]
    pub prey_size: f64,
    /// Speed multiplier while boosting.
    #[serde(default = "default_boost_multiplier")]
    pub boost_multiplier: f64,
    /// Extra energy cost per tick while boosting.
    #[serde(default = "default_boost_tick_cost")]
    pub boost_tick_cost: f64,
    /// Energy drained per second of movement; idle regeneration runs at
    /// half this rate.
    #[serde(default = "default_energy_decay")]
    pub energy_decay_rate: f64,
    /// Maximum number of trail samples retained for rendering.
    #[serde(default = "default_trail_capacity")]
    pub trail_capacity: usize,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: default_base_speed(),
            predator_size: default_predator_size(),
            prey_size: default_prey_size(),
            boost_multiplier: default_boost_multiplier(),
            boost_tick_cost: default_boost_tick_cost(),
            energy_decay_rate: default_energy_decay(),
            trail_capacity: default_trail_capacity(),
        }
    }
}

/// Proximity stimulus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulationConfig {
    /// Whether proximity stimuli fire at all.
    #[serde(default = "default_stim_enabled")]
    pub enabled: bool,
    /// Health decrement per stimulus (slider range 1-10).
    #[serde(default = "default_stim_intensity")]
    pub intensity: f64,
    /// Trigger distance in pixels (slider range 50-150).
    #[serde(default = "default_stim_threshold")]
    pub threshold: f64,
    /// Minimum seconds between consecutive stimuli.
    #[serde(default = "default_stim_cooldown")]
    pub cooldown_s: f64,
    /// How long the stimulation indicator stays visible, in seconds.
    #[serde(default = "default_stim_visible")]
    pub visible_s: f64,
}

impl Default for StimulationConfig {
    fn default() -> Self {
        Self {
            enabled: default_stim_enabled(),
            intensity: default_stim_intensity(),
            threshold: default_stim_threshold(),
            cooldown_s: default_stim_cooldown(),
            visible_s: default_stim_visible(),
        }
    }
}

/// Behavioral tunables for the AI policy and spawn placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Chase intensity above which the AI predator escalates (extra
    /// energy cost, catch-attempt counted).
    #[serde(default = "default_chase_threshold")]
    pub chase_escalation_threshold: f64,
    /// Panic level above which the AI prey escalates (extra energy
    /// cost, escape-attempt counted). The legacy front-end variant
    /// used 0.5; the enhanced variant uses 0.6.
    #[serde(default = "default_panic_threshold")]
    pub panic_escalation_threshold: f64,
    /// Energy drained per second while escalated.
    #[serde(default = "default_escalation_energy_cost")]
    pub escalation_energy_cost: f64,
    /// Distance beyond which the AI regenerates energy.
    #[serde(default = "default_regen_distance")]
    pub energy_regen_distance: f64,
    /// Half-width of the uniform noise applied to the prey's escape
    /// angle, in radians.
    #[serde(default = "default_evasion_noise")]
    pub evasion_noise_rad: f64,
    /// Minimum spawn separation between the two entities, in pixels.
    #[serde(default = "default_min_separation")]
    pub min_spawn_separation: f64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            chase_escalation_threshold: default_chase_threshold(),
            panic_escalation_threshold: default_panic_threshold(),
            escalation_energy_cost: default_escalation_energy_cost(),
            energy_regen_distance: default_regen_distance(),
            evasion_noise_rad: default_evasion_noise(),
            min_spawn_separation: default_min_separation(),
        }
    }
}

const fn default_arena_width() -> f64 {
    800.0
}
const fn default_arena_height() -> f64 {
    600.0
}
const fn default_round_duration() -> f64 {
    30.0
}
const fn default_total_rounds() -> u32 {
    12
}
const fn default_countdown() -> u32 {
    3
}
const fn default_transition() -> u32 {
    3
}
const fn default_base_speed() -> f64 {
    4.0
}
const fn default_predator_size() -> f64 {
    20.0
}
const fn default_prey_size() -> f64 {
    15.0
}
const fn default_boost_multiplier() -> f64 {
    1.5
}
const fn default_boost_tick_cost() -> f64 {
    0.5
}
const fn default_energy_decay() -> f64 {
    10.0
}
const fn default_trail_capacity() -> usize {
    600
}
const fn default_stim_enabled() -> bool {
    true
}
const fn default_stim_intensity() -> f64 {
    5.0
}
const fn default_stim_threshold() -> f64 {
    100.0
}
const fn default_stim_cooldown() -> f64 {
    1.5
}
const fn default_stim_visible() -> f64 {
    0.8
}
const fn default_chase_threshold() -> f64 {
    0.7
}
const fn default_panic_threshold() -> f64 {
    0.6
}
const fn default_escalation_energy_cost() -> f64 {
    8.0
}
const fn default_regen_distance() -> f64 {
    100.0
}
const fn default_evasion_noise() -> f64 {
    0.25
}
const fn default_min_separation() -> f64 {
    150.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = SessionConfig::parse("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert!((config.rounds.duration_s - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.rounds.total_rounds, 12);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "rounds:\n  duration_s: 45\n  total_rounds: 6\n";
        let config = SessionConfig::parse(yaml).unwrap();
        assert!((config.rounds.duration_s - 45.0).abs() < f64::EPSILON);
        assert_eq!(config.rounds.total_rounds, 6);
        // Untouched sections keep their defaults.
        assert!((config.movement.base_speed - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let yaml = concat!(
            "rounds:\n  duration_s: 500\n",
            "movement:\n  base_speed: 0.1\n",
            "stimulation:\n  intensity: 99\n  threshold: 10\n",
        );
        let config = SessionConfig::parse(yaml).unwrap();
        assert!((config.rounds.duration_s - 60.0).abs() < f64::EPSILON);
        assert!((config.movement.base_speed - 2.0).abs() < f64::EPSILON);
        assert!((config.stimulation.intensity - 10.0).abs() < f64::EPSILON);
        assert!((config.stimulation.threshold - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SessionConfig::parse(": not yaml : [");
        assert!(result.is_err());
    }
}
