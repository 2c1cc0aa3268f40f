//! Configuration of [`Experiment::conduct`](super::Experiment::conduct).
use crate::GauntletError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Experiment::conduct`](super::Experiment::conduct).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ConductConfig {
    /// Number of training episodes in an interval.
    pub training_episodes_per_interval: usize,

    /// Number of validation episodes after each training interval.
    pub validation_episodes_per_interval: usize,

    /// Budget of training episodes over all intervals.
    pub max_training_episodes: usize,

    /// Number of episodes in a test trial.
    pub episodes_per_test: usize,

    /// Number of test trials.
    pub number_of_tests: usize,

    /// Maximum number of steps of an episode. Longer episodes are truncated.
    pub episode_length_max: usize,

    /// Renders the environment after each training step.
    pub render_training: bool,

    /// Renders the environment after each validation step.
    pub render_validation: bool,

    /// Renders the environment after each test step.
    pub render_test: bool,

    /// Where to save the agent after each interval and after testing.
    pub model_dir: Option<String>,

    /// Seed of the session of a run, offset by the run number.
    pub seed: u64,
}

impl Default for ConductConfig {
    fn default() -> Self {
        Self {
            training_episodes_per_interval: 100,
            validation_episodes_per_interval: 100,
            max_training_episodes: 10000,
            episodes_per_test: 100,
            number_of_tests: 10,
            episode_length_max: 100,
            render_training: false,
            render_validation: false,
            render_test: false,
            model_dir: None,
            seed: 42,
        }
    }
}

impl ConductConfig {
    /// Sets the number of training episodes in an interval.
    pub fn training_episodes_per_interval(mut self, v: usize) -> Self {
        self.training_episodes_per_interval = v;
        self
    }

    /// Sets the number of validation episodes after each training interval.
    pub fn validation_episodes_per_interval(mut self, v: usize) -> Self {
        self.validation_episodes_per_interval = v;
        self
    }

    /// Sets the budget of training episodes.
    pub fn max_training_episodes(mut self, v: usize) -> Self {
        self.max_training_episodes = v;
        self
    }

    /// Sets the number of episodes in a test trial.
    pub fn episodes_per_test(mut self, v: usize) -> Self {
        self.episodes_per_test = v;
        self
    }

    /// Sets the number of test trials.
    pub fn number_of_tests(mut self, v: usize) -> Self {
        self.number_of_tests = v;
        self
    }

    /// Sets the maximum number of steps of an episode.
    pub fn episode_length_max(mut self, v: usize) -> Self {
        self.episode_length_max = v;
        self
    }

    /// Sets the render flags of training, validation and test.
    pub fn render(mut self, training: bool, validation: bool, test: bool) -> Self {
        self.render_training = training;
        self.render_validation = validation;
        self.render_test = test;
        self
    }

    /// Sets the directory where the agent is saved.
    pub fn model_dir<T: Into<String>>(mut self, model_dir: T) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Sets the base seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Rejects intervals, tests and episodes of zero length.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (
                "training_episodes_per_interval",
                self.training_episodes_per_interval,
            ),
            (
                "validation_episodes_per_interval",
                self.validation_episodes_per_interval,
            ),
            ("episodes_per_test", self.episodes_per_test),
            ("number_of_tests", self.number_of_tests),
            ("episode_length_max", self.episode_length_max),
        ];
        for (key, value) in checks.iter() {
            if *value == 0 {
                return Err(GauntletError::InvalidConfig(format!("{} must be positive", key)).into());
            }
        }
        Ok(())
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
