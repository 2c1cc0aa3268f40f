#![warn(missing_docs)]
//! Core of an experiment harness for reinforcement learning.
//!
//! An [`Experiment`](experiment::Experiment) drives an [`Agent`] in an
//! [`Env`] through warmup, training intervals, validation and test trials.
//! The agent of this crate, [`TdAgent`](td_agent::TdAgent), combines a
//! [`Model`] owning a [`ReplayBuffer`] with an
//! [`ExplorationPolicy`](exploration::ExplorationPolicy).
//!
//! Every collaborator call made during a run receives the [`Session`] of the
//! run, which carries its random number generator and its recorder.
pub mod dummy;
pub mod error;
pub mod experiment;
pub mod exploration;
pub mod record;
pub mod replay_buffer;
pub mod runner;
pub mod td_agent;

mod base;
pub use base::{
    Act, Agent, Batch, DiscreteAct, Env, Mode, Model, ModelUpdate, Obs, Progress, ReplayBuffer,
    Step, Transition,
};

mod session;
pub use session::Session;

mod space;
pub use error::GauntletError;
pub use space::{Space, SpaceType};
