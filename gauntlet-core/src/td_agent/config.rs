//! Configuration of [`TdAgent`](super::TdAgent).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TdAgent`](super::TdAgent).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TdAgentConfig {
    /// Name of the agent, also the scope of its model.
    pub name: String,

    /// Number of transitions sampled for each model update.
    pub batch_size: usize,
}

impl Default for TdAgentConfig {
    fn default() -> Self {
        Self {
            name: "td_agent".to_string(),
            batch_size: 100,
        }
    }
}

impl TdAgentConfig {
    /// Sets the name of the agent.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
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
    fn test_serde_td_agent_config() -> Result<()> {
        let config = TdAgentConfig::default().name("tql_agent").batch_size(32);
        let dir = TempDir::new("td_agent_config")?;
        let path = dir.path().join("td_agent.yaml");
        config.save(&path)?;
        assert_eq!(config, TdAgentConfig::load(&path)?);
        Ok(())
    }
}
