//! Tagged union of the exploration policies.
use super::{
    Boltzmann, BoltzmannConfig, Dirichlet, DirichletConfig, EpsilonGreedy, EpsilonGreedyConfig,
    ExplorationPolicy,
};
use crate::{Session, Space, SpaceType};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Explorer`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum ExplorerConfig {
    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedyConfig),

    /// Softmax action selection.
    Boltzmann(BoltzmannConfig),

    /// Greedy action selection perturbed by Dirichlet noise.
    Dirichlet(DirichletConfig),
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self::EpsilonGreedy(EpsilonGreedyConfig::default())
    }
}

impl ExplorerConfig {
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

/// One of the exploration policies of this crate.
#[derive(Debug, Clone)]
pub enum Explorer {
    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),

    /// Softmax action selection.
    Boltzmann(Boltzmann),

    /// Greedy action selection perturbed by Dirichlet noise.
    Dirichlet(Dirichlet),
}

impl Explorer {
    /// Constructs the policy selected by the configuration.
    pub fn build(config: ExplorerConfig) -> Self {
        match config {
            ExplorerConfig::EpsilonGreedy(c) => Self::EpsilonGreedy(EpsilonGreedy::build(c)),
            ExplorerConfig::Boltzmann(c) => Self::Boltzmann(Boltzmann::build(c)),
            ExplorerConfig::Dirichlet(c) => Self::Dirichlet(Dirichlet::build(c)),
        }
    }

    fn inner(&self) -> &dyn ExplorationPolicy {
        match self {
            Self::EpsilonGreedy(p) => p,
            Self::Boltzmann(p) => p,
            Self::Dirichlet(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ExplorationPolicy {
        match self {
            Self::EpsilonGreedy(p) => p,
            Self::Boltzmann(p) => p,
            Self::Dirichlet(p) => p,
        }
    }
}

impl ExplorationPolicy for Explorer {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn supported_action_spaces(&self) -> &[SpaceType] {
        self.inner().supported_action_spaces()
    }

    fn define(&mut self, act_space: &Space) -> Result<()> {
        self.inner_mut().define(act_space)
    }

    fn initialize(&mut self) {
        self.inner_mut().initialize()
    }

    fn act(&self, session: &mut Session, values: &[f32], best: usize) -> usize {
        self.inner().act(session, values, best)
    }

    fn update(&mut self) {
        self.inner_mut().update()
    }

    fn schedule(&self) -> f32 {
        self.inner().schedule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_explorer_config() -> Result<()> {
        let config = ExplorerConfig::Dirichlet(DirichletConfig::from_trade_off(1.0, 0.5, 1.0, 0.001));
        let dir = TempDir::new("explorer_config")?;
        let path = dir.path().join("explorer.yaml");
        config.save(&path)?;
        assert_eq!(config, ExplorerConfig::load(&path)?);
        Ok(())
    }

    #[test]
    fn test_explorer_dispatches() -> Result<()> {
        let mut explorer = Explorer::build(ExplorerConfig::Boltzmann(BoltzmannConfig::default()));
        assert_eq!(explorer.name(), "boltzmann");
        explorer.generate(&Space::discrete(2))?;
        explorer.update();
        assert!(explorer.schedule() < 1.0);
        explorer.initialize();
        assert_eq!(explorer.schedule(), 1.0);
        Ok(())
    }
}
