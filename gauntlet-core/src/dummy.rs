//! Deterministic collaborators used in tests.
use crate::{
    record::{Record, RecordValue},
    replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig},
    Batch, Env, GauntletError, Model, ModelUpdate, ReplayBuffer, Session, Space, Step, Transition,
};
use anyhow::Result;
use log::info;
use rand::Rng;
use std::{fs, path::Path};

/// Configuration of [`DummyEnv`].
#[derive(Debug, Clone, PartialEq)]
pub struct DummyEnvConfig {
    /// Number of observations.
    pub n_obs: usize,

    /// Number of actions.
    pub n_act: usize,

    /// Number of steps after which an episode terminates.
    pub episode_length: usize,

    /// Reward of every step.
    pub reward: f32,

    /// If `true`, [`Env::setup`] fails.
    pub fail_setup: bool,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            n_obs: 8,
            n_act: 2,
            episode_length: 4,
            reward: 1.0,
            fail_setup: false,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the episode length.
    pub fn episode_length(mut self, v: usize) -> Self {
        self.episode_length = v;
        self
    }

    /// Sets the reward of every step.
    pub fn reward(mut self, v: f32) -> Self {
        self.reward = v;
        self
    }

    /// Makes the setup fail.
    pub fn fail_setup(mut self, v: bool) -> Self {
        self.fail_setup = v;
        self
    }
}

/// An environment walking through its observations, one per step.
///
/// Every episode returns `episode_length * reward`. Calls are counted.
#[derive(Debug)]
pub struct DummyEnv {
    config: DummyEnvConfig,
    state: usize,
    n_resets: usize,
    n_steps: usize,
    n_renders: usize,
}

impl DummyEnv {
    /// Number of started episodes.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// Number of steps over all episodes.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of render calls.
    pub fn n_renders(&self) -> usize {
        self.n_renders
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = usize;
    type Act = usize;

    fn build(config: &Self::Config, _seed: u64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            state: 0,
            n_resets: 0,
            n_steps: 0,
            n_renders: 0,
        })
    }

    fn setup(&mut self) -> Result<()> {
        if self.config.fail_setup {
            return Err(GauntletError::EnvSetup("dummy environment refused to set up".into()).into());
        }
        Ok(())
    }

    fn initialize(&mut self, _session: &mut Session) {
        self.n_resets = 0;
        self.n_steps = 0;
        self.n_renders = 0;
    }

    fn reset(&mut self, _session: &mut Session) -> Result<usize> {
        self.state = 0;
        self.n_resets += 1;
        Ok(self.state)
    }

    fn step(&mut self, a: &usize, _session: &mut Session) -> Step<Self> {
        self.state += 1;
        self.n_steps += 1;
        let obs = self.state % self.config.n_obs;
        let is_terminated = self.state >= self.config.episode_length;
        Step::new(obs, *a, self.config.reward, is_terminated)
    }

    fn render(&mut self, _session: &mut Session) {
        self.n_renders += 1;
    }

    fn observation_space(&self) -> Space {
        Space::discrete(self.config.n_obs)
    }

    fn action_space(&self) -> Space {
        Space::discrete(self.config.n_act)
    }
}

/// A uniform replay buffer counting the calls made to it.
pub struct RecordingBuffer<O, A> {
    inner: SimpleReplayBuffer<O, A>,
    last: Option<Transition<O, A>>,
    n_stores: usize,
    n_gets: usize,
    n_priority_updates: usize,
}

impl<O: Clone, A: Clone> RecordingBuffer<O, A> {
    /// Most recently stored transition.
    pub fn last(&self) -> Option<&Transition<O, A>> {
        self.last.as_ref()
    }

    /// Number of stored transitions since construction.
    pub fn n_stores(&self) -> usize {
        self.n_stores
    }

    /// Number of sampled batches.
    pub fn n_gets(&self) -> usize {
        self.n_gets
    }

    /// Number of error feedbacks.
    pub fn n_priority_updates(&self) -> usize {
        self.n_priority_updates
    }
}

impl<O: Clone, A: Clone> ReplayBuffer for RecordingBuffer<O, A> {
    type Config = SimpleReplayBufferConfig;
    type Obs = O;
    type Act = A;

    fn build(config: &Self::Config) -> Self {
        Self {
            inner: SimpleReplayBuffer::build(config),
            last: None,
            n_stores: 0,
            n_gets: 0,
            n_priority_updates: 0,
        }
    }

    fn store(&mut self, tr: Transition<O, A>) -> Result<()> {
        self.last = Some(tr.clone());
        self.n_stores += 1;
        self.inner.store(tr)
    }

    fn get(&mut self, size: usize) -> Result<Batch<O, A>> {
        self.n_gets += 1;
        self.inner.get(size)
    }

    fn update(&mut self, _errors: &[f32]) {
        self.n_priority_updates += 1;
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.last = None;
    }

    fn reseed(&mut self, seed: u64) {
        self.inner.reseed(seed);
    }
}

/// A model preferring its last action everywhere and counting its updates.
pub struct CountingModel {
    scope: String,
    n_act: usize,
    warmup_episodes: usize,
    fail_generate: bool,
    n_updates: usize,
    buffer: RecordingBuffer<usize, usize>,
}

impl Default for CountingModel {
    fn default() -> Self {
        Self {
            scope: String::new(),
            n_act: 0,
            warmup_episodes: 0,
            fail_generate: false,
            n_updates: 0,
            buffer: RecordingBuffer::build(&SimpleReplayBufferConfig::default()),
        }
    }
}

impl CountingModel {
    /// Sets the number of warmup episodes.
    pub fn warmup_episodes(mut self, v: usize) -> Self {
        self.warmup_episodes = v;
        self
    }

    /// Makes the generation fail.
    pub fn fail_generate(mut self, v: bool) -> Self {
        self.fail_generate = v;
        self
    }

    /// Number of updates in the current run.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    fn values(&self) -> Vec<f32> {
        (0..self.n_act).map(|a| a as f32).collect()
    }

    fn path(&self, dir: &Path) -> std::path::PathBuf {
        dir.join(format!("{}.txt", self.scope))
    }
}

impl Model<DummyEnv> for CountingModel {
    type Buffer = RecordingBuffer<usize, usize>;

    fn generate(&mut self, scope: &str, obs_space: &Space, act_space: &Space) -> Result<()> {
        if self.fail_generate || !obs_space.is_discrete() || !act_space.is_discrete() {
            return Err(GauntletError::AgentSetup(format!("cannot generate model {}", scope)).into());
        }
        self.scope = scope.to_string();
        self.n_act = act_space.len();
        Ok(())
    }

    fn initialize(&mut self, session: &mut Session) {
        self.n_updates = 0;
        self.buffer.clear();
        self.buffer.reseed(session.rng().gen());
    }

    fn best_action(&self, _obs: &usize) -> usize {
        self.n_act.saturating_sub(1)
    }

    fn best_action_and_values(&self, obs: &usize) -> (usize, Vec<f32>) {
        (self.best_action(obs), self.values())
    }

    fn update(&mut self, _session: &mut Session, batch: Batch<usize, usize>) -> Result<ModelUpdate> {
        self.n_updates += 1;
        Ok(ModelUpdate {
            record: Record::from_slice(&[(
                "n_updates",
                RecordValue::Scalar(self.n_updates as f32),
            )]),
            loss: 0.5,
            errors: vec![1.0; batch.len()],
        })
    }

    fn buffer(&self) -> &Self::Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Self::Buffer {
        &mut self.buffer
    }

    fn warmup_episodes(&self) -> usize {
        self.warmup_episodes
    }

    fn save(&self, dir: &Path) -> Result<()> {
        fs::write(self.path(dir), self.n_updates.to_string())?;
        info!("Saved model {} in {:?}", self.scope, dir);
        Ok(())
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        self.n_updates = fs::read_to_string(self.path(dir))?.trim().parse()?;
        Ok(())
    }
}
