//! Replay buffer interface.
use super::{Batch, Transition};
use anyhow::Result;

/// Store of past transitions sampled for model updates.
///
/// Within a run the buffer has a single writer (the agent completing a step)
/// and a single reader (the model update of a training step).
pub trait ReplayBuffer {
    /// Configuration parameters for the replay buffer.
    type Config: Clone;

    /// Observation type of stored transitions.
    type Obs;

    /// Action type of stored transitions.
    type Act;

    /// Builds a new replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Self
    where
        Self: Sized;

    /// Stores a transition, overwriting the oldest one when full.
    fn store(&mut self, tr: Transition<Self::Obs, Self::Act>) -> Result<()>;

    /// Samples a batch of `size` transitions.
    ///
    /// Fails with [`GauntletError::BufferUnderflow`](crate::GauntletError::BufferUnderflow)
    /// if fewer than `size` transitions are stored.
    fn get(&mut self, size: usize) -> Result<Batch<Self::Obs, Self::Act>>;

    /// Feeds the per-sample errors of the last batch back to the buffer.
    ///
    /// Prioritized buffers update the sampling priorities of the samples
    /// returned by the latest [`ReplayBuffer::get`]. Other buffers ignore it.
    fn update(&mut self, errors: &[f32]);

    /// Returns the current number of stored transitions.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all transitions.
    fn clear(&mut self);

    /// Restarts the random number generator used for sampling.
    ///
    /// Models call it when a run starts, with a seed drawn from the session,
    /// so that batches depend on the seed of the run only.
    fn reseed(&mut self, seed: u64);
}
