//! Temporal-difference agent.
use super::TdAgentConfig;
use crate::{
    exploration::ExplorationPolicy,
    record::RecordValue,
    Act, Agent, DiscreteAct, Env, Model, Obs, Progress, ReplayBuffer, Session, Space, Transition,
};
use anyhow::{Context, Result};
use log::{debug, info};
use std::{marker::PhantomData, path::Path};

/// An agent performing one model update per training step.
///
/// The agent owns a [`Model`], which itself owns a replay buffer, and an
/// [`ExplorationPolicy`] choosing among the action values of the model in
/// training. In warmup the agent acts at random and only fills the buffer.
/// In inference it takes the greedy action of the model and learns nothing.
pub struct TdAgent<E, M, P>
where
    E: Env,
    E::Act: DiscreteAct,
    M: Model<E>,
    P: ExplorationPolicy,
{
    name: String,
    batch_size: usize,
    model: M,
    policy: P,
    obs_space: Space,
    act_space: Space,
    n_updates: usize,
    phantom: PhantomData<E>,
}

impl<E, M, P> TdAgent<E, M, P>
where
    E: Env,
    E::Act: DiscreteAct,
    M: Model<E>,
    P: ExplorationPolicy,
{
    /// Constructs the agent.
    pub fn build(config: TdAgentConfig, model: M, policy: P) -> Self {
        Self {
            name: config.name,
            batch_size: config.batch_size,
            model,
            policy,
            obs_space: Space::discrete(0),
            act_space: Space::discrete(0),
            n_updates: 0,
            phantom: PhantomData,
        }
    }

    /// The model of the agent.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The exploration policy of the agent.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Number of model updates in the current run.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    fn store(
        &mut self,
        obs: &E::Obs,
        act: &E::Act,
        reward: f32,
        next_obs: Option<&E::Obs>,
    ) -> Result<()> {
        let (next_obs, is_terminal) = match next_obs {
            Some(next_obs) => (next_obs.clone(), false),
            None => (E::Obs::sentinel(&self.obs_space), true),
        };
        self.model.buffer_mut().store(Transition {
            obs: obs.clone(),
            act: act.clone(),
            reward,
            next_obs,
            is_terminal,
        })
    }
}

impl<E, M, P> Agent<E> for TdAgent<E, M, P>
where
    E: Env,
    E::Act: DiscreteAct,
    M: Model<E>,
    P: ExplorationPolicy,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, scope: &str, obs_space: &Space, act_space: &Space) -> Result<()> {
        info!("Setting up agent {} in {}", self.name, scope);
        self.obs_space = obs_space.clone();
        self.act_space = act_space.clone();
        self.policy
            .generate(act_space)
            .with_context(|| format!("Exploration policy of agent {}", self.name))?;
        self.model
            .generate(&self.name, obs_space, act_space)
            .with_context(|| format!("Model of agent {}", self.name))?;
        Ok(())
    }

    fn initialize(&mut self, session: &mut Session) {
        self.n_updates = 0;
        self.model.initialize(session);
        self.policy.initialize();
    }

    fn warmup_episodes(&self) -> usize {
        self.model.warmup_episodes()
    }

    fn act_warmup(&mut self, session: &mut Session, _obs: &E::Obs) -> E::Act {
        E::Act::random(&self.act_space, session.rng())
    }

    fn act_train(&mut self, session: &mut Session, obs: &E::Obs) -> E::Act {
        let (best, values) = self.model.best_action_and_values(obs);
        let ix = self.policy.act(session, &values, best.index());
        E::Act::from_index(ix)
    }

    fn act_inference(&mut self, _session: &mut Session, obs: &E::Obs) -> E::Act {
        self.model.best_action(obs)
    }

    fn complete_step_warmup(
        &mut self,
        _session: &mut Session,
        obs: &E::Obs,
        act: &E::Act,
        reward: f32,
        next_obs: Option<&E::Obs>,
        _progress: &Progress,
    ) -> Result<()> {
        self.store(obs, act, reward, next_obs)
    }

    fn complete_step_train(
        &mut self,
        session: &mut Session,
        obs: &E::Obs,
        act: &E::Act,
        reward: f32,
        next_obs: Option<&E::Obs>,
        progress: &Progress,
    ) -> Result<()> {
        self.store(obs, act, reward, next_obs)?;

        let batch = self.model.buffer_mut().get(self.batch_size)?;
        let update = self.model.update(session, batch)?;
        self.model.buffer_mut().update(&update.errors);
        self.n_updates += 1;

        let mut record = update.record;
        record.insert("loss", RecordValue::Scalar(update.loss));
        record.insert(
            "train_steps",
            RecordValue::Scalar(progress.absolute_step as f32),
        );
        session.write(record);
        Ok(())
    }

    fn complete_episode_train(
        &mut self,
        _session: &mut Session,
        episode_return: f32,
        progress: &Progress,
    ) -> Result<()> {
        self.policy.update();
        debug!(
            "{}: training episode {} returned {}, schedule = {}",
            self.name,
            progress.absolute_episode,
            episode_return,
            self.policy.schedule()
        );
        Ok(())
    }

    fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        self.model.save(dir)
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        self.model.load(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{CountingModel, DummyEnv, DummyEnvConfig},
        exploration::{EpsilonGreedy, EpsilonGreedyConfig},
        record::BufferedRecorder,
        GauntletError, Mode,
    };

    type DummyAgent = TdAgent<DummyEnv, CountingModel, EpsilonGreedy>;

    fn agent(batch_size: usize) -> Result<DummyAgent> {
        let env = DummyEnv::build(&DummyEnvConfig::default(), 0)?;
        let mut agent = TdAgent::build(
            TdAgentConfig::default().batch_size(batch_size),
            CountingModel::default(),
            EpsilonGreedy::build(EpsilonGreedyConfig::default()),
        );
        agent.setup("test", &env.observation_space(), &env.action_space())?;
        Ok(agent)
    }

    #[test]
    fn test_one_update_per_train_step() -> Result<()> {
        let mut agent = agent(2)?;
        let mut recorder = BufferedRecorder::new();
        {
            let mut session = Session::new("test", 0, &mut recorder);
            agent.initialize(&mut session);
            let progress = Progress::default();
            agent.complete_step(Mode::Warmup, &mut session, &0, &1, 0.0, Some(&1), &progress)?;
            agent.complete_step(Mode::Warmup, &mut session, &1, &1, 0.0, Some(&2), &progress)?;
            assert_eq!(agent.model().n_updates(), 0);

            for step in 0..5 {
                let progress = Progress {
                    absolute_step: step,
                    ..Progress::default()
                };
                agent.complete_step(Mode::Train, &mut session, &2, &0, 1.0, Some(&3), &progress)?;
                assert_eq!(agent.model().n_updates(), step + 1);
                assert_eq!(agent.model().buffer().n_stores(), step + 3);
                assert_eq!(agent.model().buffer().n_priority_updates(), step + 1);
            }
        }
        assert_eq!(recorder.scalars("train_steps"), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(recorder.scalars("loss").len(), 5);
        Ok(())
    }

    #[test]
    fn test_terminal_step_stores_sentinel() -> Result<()> {
        let mut agent = agent(1)?;
        let mut recorder = BufferedRecorder::new();
        let mut session = Session::new("test", 0, &mut recorder);
        agent.complete_step(Mode::Warmup, &mut session, &3, &1, 1.0, None, &Progress::default())?;
        let tr = agent.model().buffer().last().unwrap();
        assert_eq!(tr.next_obs, 0);
        assert!(tr.is_terminal);
        Ok(())
    }

    #[test]
    fn test_train_step_underflow() -> Result<()> {
        let mut agent = agent(10)?;
        let mut recorder = BufferedRecorder::new();
        let mut session = Session::new("test", 0, &mut recorder);
        let err = agent
            .complete_step(Mode::Train, &mut session, &0, &0, 0.0, Some(&1), &Progress::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<GauntletError>(),
            Some(&GauntletError::BufferUnderflow {
                requested: 10,
                available: 1
            })
        );
        Ok(())
    }

    #[test]
    fn test_episode_updates_policy_only_in_training() -> Result<()> {
        let mut agent = agent(1)?;
        let mut recorder = BufferedRecorder::new();
        let mut session = Session::new("test", 0, &mut recorder);
        agent.initialize(&mut session);
        let progress = Progress::default();

        agent.complete_episode(Mode::Warmup, &mut session, 0.0, &progress)?;
        agent.complete_episode(Mode::Inference, &mut session, 0.0, &progress)?;
        assert_eq!(agent.policy().schedule(), 1.0);

        agent.complete_episode(Mode::Train, &mut session, 0.0, &progress)?;
        assert!(agent.policy().schedule() < 1.0);
        Ok(())
    }

    #[test]
    fn test_inference_is_greedy() -> Result<()> {
        let mut agent = agent(1)?;
        let mut recorder = BufferedRecorder::new();
        let mut session = Session::new("test", 0, &mut recorder);
        let best = agent.model().best_action(&0);
        assert!((0..20).all(|_| agent.act(Mode::Inference, &mut session, &0) == best));
        Ok(())
    }

    #[test]
    fn test_unsupported_action_space_fails_setup() {
        let mut agent: DummyAgent = TdAgent::build(
            TdAgentConfig::default(),
            CountingModel::default(),
            EpsilonGreedy::build(EpsilonGreedyConfig::default()),
        );
        let err = agent
            .setup("test", &Space::discrete(4), &Space::continuous(&[1]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GauntletError>(),
            Some(GauntletError::UnsupportedActionSpace { .. })
        ));
    }
}
