//! Configuration of [`TabularModel`](super::TabularModel).
use anyhow::Result;
use gauntlet_core::replay_buffer::{PerConfig, PrioritizedReplayBufferConfig};
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Bootstrap target of the temporal-difference update.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum TdTarget {
    /// `r + gamma * max_a Q(s', a)`.
    QLearning,

    /// `r + gamma * sum_a pi(a|s') Q(s', a)`, with `pi` epsilon-greedy
    /// with respect to `Q(s', .)`.
    ExpectedSarsa {
        /// Exploration rate of the target policy.
        epsilon: f32,
    },
}

/// Configuration of [`TabularModel`](super::TabularModel).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TabularModelConfig {
    /// Step size of the update.
    pub learning_rate: f32,

    /// Discount factor.
    pub discount_factor: f32,

    /// Bootstrap target.
    pub target: TdTarget,

    /// Number of warmup episodes before training.
    pub warmup_episodes: usize,

    /// Replay buffer of the model.
    pub buffer: PrioritizedReplayBufferConfig,
}

impl Default for TabularModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            discount_factor: 0.99,
            target: TdTarget::QLearning,
            warmup_episodes: 100,
            buffer: PrioritizedReplayBufferConfig::default().capacity(1000),
        }
    }
}

impl TabularModelConfig {
    /// Sets the step size.
    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the bootstrap target.
    pub fn target(mut self, v: TdTarget) -> Self {
        self.target = v;
        self
    }

    /// Sets the number of warmup episodes.
    ///
    /// Warmup must store at least one batch of transitions. Every episode
    /// has one step or more, so a value of at least the batch size of the
    /// agent is always enough.
    pub fn warmup_episodes(mut self, v: usize) -> Self {
        self.warmup_episodes = v;
        self
    }

    /// Sets the capacity of the replay buffer.
    pub fn buffer_capacity(mut self, v: usize) -> Self {
        self.buffer = self.buffer.capacity(v);
        self
    }

    /// Sets the prioritization parameters of the replay buffer.
    pub fn per(mut self, v: PerConfig) -> Self {
        self.buffer = self.buffer.per(v);
        self
    }

    /// Sets the seed of the replay buffer.
    pub fn seed(mut self, v: u64) -> Self {
        self.buffer = self.buffer.seed(v);
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_tabular_model_config() -> Result<()> {
        let config = TabularModelConfig::default()
            .target(TdTarget::ExpectedSarsa { epsilon: 0.1 })
            .learning_rate(0.5)
            .buffer_capacity(64);
        let dir = TempDir::new("tabular_model_config")?;
        let path = dir.path().join("tabular_model.yaml");
        config.save(&path)?;
        assert_eq!(config, TabularModelConfig::load(&path)?);
        Ok(())
    }
}
