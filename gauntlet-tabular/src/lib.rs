//! Tabular collaborators of the gauntlet experiment harness.
//!
//! * [`TabularModel`] - action values in a table, learned by Q-learning or
//!   expected SARSA from a prioritized replay buffer
//! * [`FrozenLake`] - the frozen lake grid world
mod frozen_lake;
mod model;
pub use frozen_lake::{FrozenLake, FrozenLakeConfig};
pub use model::{TabularModel, TabularModelConfig, TdTarget};
