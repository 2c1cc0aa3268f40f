//! Environment.
use super::{Act, Obs};
use crate::{Session, Space};
use anyhow::Result;

/// Outcome of an environment step `(a_t, o_t+1, r_t, done_t)`.
pub struct Step<E: Env> {
    /// Action applied to the environment.
    pub act: E::Act,

    /// Observation after the step.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode reached a terminal state.
    pub is_terminated: bool,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, act: E::Act, reward: f32, is_terminated: bool) -> Self {
        Self {
            act,
            obs,
            reward,
            is_terminated,
        }
    }
}

/// Represents an environment, typically an MDP.
///
/// The experiment only consumes environments. Steps are assumed to be total:
/// a call to [`Env::step`] always yields a [`Step`].
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: u64) -> Result<Self>
    where
        Self: Sized;

    /// Prepares the environment before an experiment is conducted.
    fn setup(&mut self) -> Result<()>;

    /// Resets transient state at the start of an experiment run.
    fn initialize(&mut self, session: &mut Session);

    /// Starts a new episode and returns its first observation.
    fn reset(&mut self, session: &mut Session) -> Result<Self::Obs>;

    /// Performs an environment step.
    fn step(&mut self, a: &Self::Act, session: &mut Session) -> Step<Self>
    where
        Self: Sized;

    /// Renders the current state of the environment.
    fn render(&mut self, session: &mut Session);

    /// Descriptor of the observation space.
    fn observation_space(&self) -> Space;

    /// Descriptor of the action space.
    fn action_space(&self) -> Space;
}
