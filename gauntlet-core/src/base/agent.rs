//! Agent.
use super::Env;
use crate::{Session, Space};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

/// Operating mode of an [`Agent`].
///
/// The mode is always chosen by the experiment, never by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Random exploration for filling the buffer, no learning.
    Warmup,

    /// Exploration driven by the model and an exploration policy, with learning.
    Train,

    /// Greedy action of the model, no learning.
    Inference,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Warmup => write!(f, "warmup"),
            Mode::Train => write!(f, "train"),
            Mode::Inference => write!(f, "inference"),
        }
    }
}

/// Position of a step within the current phase and the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Step within the current episode.
    pub step: usize,

    /// Step counted over all episodes of the mode in this run.
    pub absolute_step: usize,

    /// Episode within the current interval.
    pub episode: usize,

    /// Episode counted over all intervals of the mode in this run.
    pub absolute_episode: usize,
}

/// Mediates between a model, an exploration policy and the experiment loop.
///
/// Action selection and step/episode completion exist once per [`Mode`].
/// `next_obs` is `None` when the step ended the episode in a terminal state.
pub trait Agent<E: Env> {
    /// Name of the agent.
    fn name(&self) -> &str;

    /// Generates the exploration policy and the model for the given spaces.
    fn setup(&mut self, scope: &str, obs_space: &Space, act_space: &Space) -> Result<()>;

    /// Resets transient state at the start of a run.
    fn initialize(&mut self, session: &mut Session);

    /// Number of warmup episodes required before training.
    fn warmup_episodes(&self) -> usize;

    /// Returns `true` if warmup episodes must precede training.
    fn require_pre_train(&self) -> bool {
        self.warmup_episodes() > 0
    }

    /// Takes a uniformly random action.
    fn act_warmup(&mut self, session: &mut Session, obs: &E::Obs) -> E::Act;

    /// Takes an exploratory action.
    fn act_train(&mut self, session: &mut Session, obs: &E::Obs) -> E::Act;

    /// Takes the greedy action.
    fn act_inference(&mut self, session: &mut Session, obs: &E::Obs) -> E::Act;

    /// Completes a warmup step.
    fn complete_step_warmup(
        &mut self,
        session: &mut Session,
        obs: &E::Obs,
        act: &E::Act,
        reward: f32,
        next_obs: Option<&E::Obs>,
        progress: &Progress,
    ) -> Result<()>;

    /// Completes a training step.
    fn complete_step_train(
        &mut self,
        session: &mut Session,
        obs: &E::Obs,
        act: &E::Act,
        reward: f32,
        next_obs: Option<&E::Obs>,
        progress: &Progress,
    ) -> Result<()>;

    /// Completes an inference step.
    #[allow(unused_variables)]
    fn complete_step_inference(
        &mut self,
        session: &mut Session,
        obs: &E::Obs,
        act: &E::Act,
        reward: f32,
        next_obs: Option<&E::Obs>,
        progress: &Progress,
    ) -> Result<()> {
        Ok(())
    }

    /// Completes a warmup episode.
    #[allow(unused_variables)]
    fn complete_episode_warmup(
        &mut self,
        session: &mut Session,
        episode_return: f32,
        progress: &Progress,
    ) -> Result<()> {
        Ok(())
    }

    /// Completes a training episode.
    fn complete_episode_train(
        &mut self,
        session: &mut Session,
        episode_return: f32,
        progress: &Progress,
    ) -> Result<()>;

    /// Completes an inference episode.
    #[allow(unused_variables)]
    fn complete_episode_inference(
        &mut self,
        session: &mut Session,
        episode_return: f32,
        progress: &Progress,
    ) -> Result<()> {
        Ok(())
    }

    /// Saves the agent in the given directory.
    fn save(&self, dir: &Path) -> Result<()>;

    /// Loads the agent from the given directory.
    fn load(&mut self, dir: &Path) -> Result<()>;

    /// Takes an action in the given mode.
    fn act(&mut self, mode: Mode, session: &mut Session, obs: &E::Obs) -> E::Act {
        match mode {
            Mode::Warmup => self.act_warmup(session, obs),
            Mode::Train => self.act_train(session, obs),
            Mode::Inference => self.act_inference(session, obs),
        }
    }

    /// Completes a step in the given mode.
    #[allow(clippy::too_many_arguments)]
    fn complete_step(
        &mut self,
        mode: Mode,
        session: &mut Session,
        obs: &E::Obs,
        act: &E::Act,
        reward: f32,
        next_obs: Option<&E::Obs>,
        progress: &Progress,
    ) -> Result<()> {
        match mode {
            Mode::Warmup => {
                self.complete_step_warmup(session, obs, act, reward, next_obs, progress)
            }
            Mode::Train => self.complete_step_train(session, obs, act, reward, next_obs, progress),
            Mode::Inference => {
                self.complete_step_inference(session, obs, act, reward, next_obs, progress)
            }
        }
    }

    /// Completes an episode in the given mode.
    fn complete_episode(
        &mut self,
        mode: Mode,
        session: &mut Session,
        episode_return: f32,
        progress: &Progress,
    ) -> Result<()> {
        match mode {
            Mode::Warmup => self.complete_episode_warmup(session, episode_return, progress),
            Mode::Train => self.complete_episode_train(session, episode_return, progress),
            Mode::Inference => self.complete_episode_inference(session, episode_return, progress),
        }
    }
}
