//! Configuration of [`FrozenLake`](super::FrozenLake).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`FrozenLake`](super::FrozenLake).
///
/// Each row of the map is a string of cells:
///
/// * `S` - start, exactly one
/// * `F` - frozen surface
/// * `H` - hole, ends the episode
/// * `G` - goal, ends the episode with reward 1
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FrozenLakeConfig {
    /// Rows of the map, from top to bottom.
    pub map: Vec<String>,

    /// If `true`, the agent moves in the intended direction or in one of the
    /// two perpendicular directions, each with probability 1/3.
    pub is_slippery: bool,
}

impl Default for FrozenLakeConfig {
    fn default() -> Self {
        Self {
            map: ["SFFF", "FHFH", "FFFH", "HFFG"]
                .iter()
                .map(|row| row.to_string())
                .collect(),
            is_slippery: true,
        }
    }
}

impl FrozenLakeConfig {
    /// Sets the map.
    pub fn map<S: AsRef<str>>(mut self, rows: &[S]) -> Self {
        self.map = rows.iter().map(|r| r.as_ref().to_string()).collect();
        self
    }

    /// Sets slipperiness.
    pub fn is_slippery(mut self, v: bool) -> Self {
        self.is_slippery = v;
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
