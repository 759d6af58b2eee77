//! Shaped reward computed from the game's progress counters.
//!
//! The raw reward of the collaborator is discarded; the shaped reward is the
//! sum, in order, of
//! - forward progress, clamped to `[0, distance_cap]`
//! - elapsed game time times `time_weight`
//! - change in player status times `status_weight`
//! - change in score times `score_weight`
//! - on the terminal step, `+terminal_bonus` past `goal_distance`, else `-terminal_bonus`

use tracing::{debug, trace};

use crate::config::{RewardConfig, ShaperState};
use crate::core::StepInfo;

/// Owns the previous-step counters the reward deltas are taken against.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardShaper {
    config: RewardConfig,
    state: ShaperState,
}

impl RewardShaper {
    pub fn new(config: RewardConfig) -> Self {
        Self { state: config.initial_state, config }
    }

    /// Restore the episode-start counters.
    pub fn reset(&mut self) {
        self.state = self.config.initial_state;
    }

    pub fn state(&self) -> &ShaperState { &self.state }

    pub fn config(&self) -> &RewardConfig { &self.config }

    /// Compute the shaped reward for one collaborator step and advance the counters.
    pub fn shape(&mut self, info: &StepInfo, done: bool) -> f64 {
        let c = &self.config;
        let s = &mut self.state;
        let mut reward = 0.0;

        let progress = (info.distance - s.prev_distance).clamp(0.0, c.distance_cap);
        reward += progress;
        s.prev_distance = info.distance;

        let clock = (s.prev_time - info.time) * c.time_weight;
        reward += clock;
        s.prev_time = info.time;

        let status = (info.player_status - s.prev_status) * c.status_weight;
        reward += status;
        s.prev_status = info.player_status;

        let score = (info.score - s.prev_score) * c.score_weight;
        reward += score;
        s.prev_score = info.score;

        trace!(progress, clock, status, score, "shaped reward terms");

        if done {
            let cleared = info.distance >= c.goal_distance;
            let bonus = if cleared { c.terminal_bonus } else { -c.terminal_bonus };
            debug!(distance = info.distance, cleared, bonus, "episode finished");
            reward += bonus;
        }
        reward
    }
}

impl Default for RewardShaper {
    fn default() -> Self { Self::new(RewardConfig::default()) }
}
