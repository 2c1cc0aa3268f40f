//! Model.
use super::{Batch, Env, ReplayBuffer};
use crate::{record::Record, Session, Space};
use anyhow::Result;
use std::path::Path;

/// Result of a model update.
#[derive(Debug, Clone)]
pub struct ModelUpdate {
    /// Telemetry of the update.
    pub record: Record,

    /// Loss of the update.
    pub loss: f32,

    /// Per-sample absolute error, in the order of the batch.
    pub errors: Vec<f32>,
}

/// A trainable predictor of action values, tabular or parametric.
///
/// A model owns the replay buffer it learns from.
pub trait Model<E: Env> {
    /// Replay buffer of the model.
    type Buffer: ReplayBuffer<Obs = E::Obs, Act = E::Act>;

    /// Allocates the model for the given spaces under the given scope name.
    ///
    /// The scope name also addresses the model in [`Model::save`] and [`Model::load`].
    fn generate(&mut self, scope: &str, obs_space: &Space, act_space: &Space) -> Result<()>;

    /// Resets the model and its buffer at the start of a run.
    fn initialize(&mut self, session: &mut Session);

    /// Returns the greedy action for the given observation.
    fn best_action(&self, obs: &E::Obs) -> E::Act;

    /// Returns the greedy action and the values of all actions.
    fn best_action_and_values(&self, obs: &E::Obs) -> (E::Act, Vec<f32>);

    /// Performs an update step with the given batch.
    fn update(
        &mut self,
        session: &mut Session,
        batch: Batch<E::Obs, E::Act>,
    ) -> Result<ModelUpdate>;

    /// Replay buffer.
    fn buffer(&self) -> &Self::Buffer;

    /// Mutable replay buffer.
    fn buffer_mut(&mut self) -> &mut Self::Buffer;

    /// Number of episodes of random exploration required before training.
    fn warmup_episodes(&self) -> usize;

    /// Saves the parameters of the model in the given directory.
    fn save(&self, dir: &Path) -> Result<()>;

    /// Loads the parameters of the model from the given directory.
    fn load(&mut self, dir: &Path) -> Result<()>;
}
