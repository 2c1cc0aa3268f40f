//! Epsilon-greedy exploration.
use super::{ExplorationPolicy, Schedule};
use crate::{Session, Space, SpaceType};
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration of [`EpsilonGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedyConfig {
    /// Initial exploration rate.
    pub exploration_rate_max: f32,

    /// Final exploration rate.
    pub exploration_rate_min: f32,

    /// Decrease of the exploration rate per training episode.
    pub exploration_rate_decay: f32,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            exploration_rate_max: 1.0,
            exploration_rate_min: 0.001,
            exploration_rate_decay: 0.001,
        }
    }
}

impl EpsilonGreedyConfig {
    /// Sets the initial exploration rate.
    pub fn exploration_rate_max(mut self, v: f32) -> Self {
        self.exploration_rate_max = v;
        self
    }

    /// Sets the final exploration rate.
    pub fn exploration_rate_min(mut self, v: f32) -> Self {
        self.exploration_rate_min = v;
        self
    }

    /// Sets the decrease of the exploration rate per training episode.
    pub fn exploration_rate_decay(mut self, v: f32) -> Self {
        self.exploration_rate_decay = v;
        self
    }
}

/// Takes a uniformly random action with probability epsilon and the greedy
/// action otherwise.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    schedule: Schedule,
    n_actions: usize,
}

impl EpsilonGreedy {
    /// Constructs the policy.
    pub fn build(config: EpsilonGreedyConfig) -> Self {
        Self {
            schedule: Schedule::new(
                config.exploration_rate_max,
                config.exploration_rate_min,
                config.exploration_rate_decay,
            ),
            n_actions: 0,
        }
    }
}

impl ExplorationPolicy for EpsilonGreedy {
    fn name(&self) -> &str {
        "epsilon_greedy"
    }

    fn supported_action_spaces(&self) -> &[SpaceType] {
        &[SpaceType::Discrete]
    }

    fn define(&mut self, act_space: &Space) -> Result<()> {
        self.schedule.validate(self.name())?;
        self.n_actions = act_space.len();
        self.schedule.reset();
        Ok(())
    }

    fn initialize(&mut self) {
        self.schedule.reset();
    }

    fn act(&self, session: &mut Session, values: &[f32], best: usize) -> usize {
        let n_actions = self.n_actions.max(values.len());
        let rng = session.rng();
        if n_actions > 0 && rng.gen::<f32>() < self.schedule.value() {
            rng.gen_range(0..n_actions)
        } else {
            best
        }
    }

    fn update(&mut self) {
        self.schedule.step();
    }

    fn schedule(&self) -> f32 {
        self.schedule.value()
    }
}
