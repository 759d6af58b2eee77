//! Named, validated constants for the preprocessing pipeline.
//!
//! Defaults reproduce the classic platformer setup: 84x84 frames, four-frame
//! stacks, a 0.9999 decay for observation statistics and the reward weights
//! used for the first world of the game.

use std::collections::HashMap;

use crate::core::{GymError, Result};

/// Key-value overrides, e.g. parsed from a command line or an env registry.
pub type KwArgs = HashMap<String, String>;

/// Target size of processed frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub height: u32,
    pub width: u32,
}

impl Resolution {
    pub const fn new(height: u32, width: u32) -> Self { Self { height, width } }
}

impl Default for Resolution {
    fn default() -> Self { Self::new(84, 84) }
}

/// Decay and stabilizer of the running observation statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizerConfig {
    pub alpha: f64,
    pub epsilon: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self { Self { alpha: 0.9999, epsilon: 1e-8 } }
}

/// Values the reward shaper starts every episode from.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShaperState {
    pub prev_distance: f64,
    pub prev_time: f64,
    pub prev_status: f64,
    pub prev_score: f64,
}

impl Default for ShaperState {
    /// Starting values reported by the game at the beginning of a level.
    fn default() -> Self {
        Self { prev_distance: 40.0, prev_time: 400.0, prev_status: 0.0, prev_score: 0.0 }
    }
}

/// Coefficients of the shaped reward.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardConfig {
    /// Upper clamp of the per-step forward progress term.
    pub distance_cap: f64,
    /// Multiplier of elapsed game time (negative: time costs reward).
    pub time_weight: f64,
    pub status_weight: f64,
    pub score_weight: f64,
    /// Magnitude of the end-of-episode bonus or penalty.
    pub terminal_bonus: f64,
    /// Distance at or beyond which a finished episode counts as a clear.
    pub goal_distance: f64,
    pub initial_state: ShaperState,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            distance_cap: 2.0,
            time_weight: -0.1,
            status_weight: 5.0,
            score_weight: 0.025,
            terminal_bonus: 50.0,
            goal_distance: 3225.0,
            initial_state: ShaperState::default(),
        }
    }
}

/// Full pipeline configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    pub resolution: Resolution,
    /// Frames per stacked observation; also the action repeat count.
    pub stack_depth: usize,
    pub normalizer: NormalizerConfig,
    pub reward: RewardConfig,
    /// Refuse `step` before the first `reset` or after a terminal step.
    pub enforce_order: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            stack_depth: 4,
            normalizer: NormalizerConfig::default(),
            reward: RewardConfig::default(),
            enforce_order: true,
        }
    }
}

impl PipelineConfig {
    /// Check every field; returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.resolution.height == 0 || self.resolution.width == 0 {
            return Err(GymError::InvalidConfig(format!(
                "resolution must be non-zero, got {}x{}",
                self.resolution.height, self.resolution.width
            )));
        }
        if self.stack_depth == 0 {
            return Err(GymError::InvalidConfig("stack_depth must be at least 1".into()));
        }
        let alpha = self.normalizer.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(GymError::InvalidConfig(format!("alpha must lie in (0, 1), got {alpha}")));
        }
        if !(self.normalizer.epsilon > 0.0 && self.normalizer.epsilon.is_finite()) {
            return Err(GymError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.normalizer.epsilon
            )));
        }
        let r = &self.reward;
        if !(r.distance_cap >= 0.0 && r.distance_cap.is_finite()) {
            return Err(GymError::InvalidConfig(format!(
                "distance_cap must be finite and >= 0, got {}",
                r.distance_cap
            )));
        }
        let coefficients = [
            ("time_weight", r.time_weight),
            ("status_weight", r.status_weight),
            ("score_weight", r.score_weight),
            ("terminal_bonus", r.terminal_bonus),
            ("goal_distance", r.goal_distance),
            ("initial_state.prev_distance", r.initial_state.prev_distance),
            ("initial_state.prev_time", r.initial_state.prev_time),
            ("initial_state.prev_status", r.initial_state.prev_status),
            ("initial_state.prev_score", r.initial_state.prev_score),
        ];
        if let Some((name, value)) = coefficients.iter().find(|(_, v)| !v.is_finite()) {
            return Err(GymError::InvalidConfig(format!("{name} must be finite, got {value}")));
        }
        Ok(())
    }

    /// Start from the defaults and apply string overrides, then validate.
    ///
    /// Recognised keys: `height`, `width`, `stack_depth`, `alpha`, `epsilon`,
    /// `goal_distance`, `terminal_bonus`, `enforce_order`.
    pub fn from_kwargs(kwargs: &KwArgs) -> Result<Self> {
        let mut config = Self::default();
        for (key, value) in kwargs {
            match key.as_str() {
                "height" => config.resolution.height = parse_kwarg(key, value)?,
                "width" => config.resolution.width = parse_kwarg(key, value)?,
                "stack_depth" => config.stack_depth = parse_kwarg(key, value)?,
                "alpha" => config.normalizer.alpha = parse_kwarg(key, value)?,
                "epsilon" => config.normalizer.epsilon = parse_kwarg(key, value)?,
                "goal_distance" => config.reward.goal_distance = parse_kwarg(key, value)?,
                "terminal_bonus" => config.reward.terminal_bonus = parse_kwarg(key, value)?,
                "enforce_order" => config.enforce_order = parse_kwarg(key, value)?,
                other => return Err(GymError::InvalidConfig(format!("unknown option `{other}`"))),
            }
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_kwarg<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GymError::InvalidConfig(format!("cannot parse `{key}` from {value:?}")))
}
