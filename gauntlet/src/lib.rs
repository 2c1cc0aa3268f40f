//! An experiment harness for reinforcement learning.
//!
//! Gauntlet consists of the following crates:
//!
//! * [gauntlet-core](gauntlet_core) defines environments, agents, models and
//!   replay buffers, the exploration policies, the [`Experiment`] loop
//!   running an agent through warmup, training, validation and test, and the
//!   runners for repeated and parallel experiments.
//! * [gauntlet-tabular](gauntlet_tabular) provides the tabular Q-learning and
//!   expected SARSA models and the frozen lake grid world.
//! * [gauntlet-tensorboard](gauntlet_tensorboard) has [`TensorboardRecorder`]
//!   to write the telemetry of experiments as TensorBoard event files.
//!   It is based on [tensorboard-rs](https://crates.io/crates/tensorboard-rs).
//!
//! See `examples/frozen_lake_tql.rs` for three exploration policies compared on
//! the frozen lake.
//!
//! [`Experiment`]: gauntlet_core::experiment::Experiment
//! [`TensorboardRecorder`]: gauntlet_tensorboard::TensorboardRecorder
pub use gauntlet_core;
pub use gauntlet_tabular;
pub use gauntlet_tensorboard;
