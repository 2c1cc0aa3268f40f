//! Experiment.
use super::{ConductConfig, ExperimentOutcome};
use crate::{
    record::{
        Record,
        RecordValue::{DateTime, Scalar},
        Recorder,
    },
    Agent, Env, GauntletError, Mode, Progress, Session, Step,
};
use anyhow::Result;
use chrono::Local;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

/// Phase of an [`Experiment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// Not set up, or the latest setup failed.
    Unset,

    /// Set up, ready to be conducted.
    Setup,

    /// Running warmup episodes.
    PreTrain,

    /// Running a training interval.
    TrainInterval,

    /// Running validation episodes after a training interval.
    Validate,

    /// Running test trials.
    Test,

    /// Conducted to the end.
    Done,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Drives an agent in an environment through training, validation and test.
///
/// # Conducting an experiment
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Unset
///     Unset --> Setup: setup
///     Setup --> PreTrain: conduct, warmup required
///     Setup --> TrainInterval: conduct
///     PreTrain --> TrainInterval
///     TrainInterval --> Validate
///     Validate --> TrainInterval: below threshold, budget left
///     Validate --> Test: threshold reached or budget spent
///     Setup --> Test: no training budget
///     Test --> Done
///     Done --> TrainInterval: conduct again
///     PreTrain --> Unset: error
///     TrainInterval --> Unset: error
///     Validate --> Unset: error
///     Test --> Unset: error
/// ```
///
/// 1. If the agent requires it, [`Agent::warmup_episodes`] episodes are run
///    in [`Mode::Warmup`].
/// 2. While fewer than `max_training_episodes` training episodes have run:
///     * a training interval of `training_episodes_per_interval` episodes is
///       run in [`Mode::Train`]. The last interval is shortened so that the
///       budget is never exceeded.
///     * `validation_episodes_per_interval` episodes are run in
///       [`Mode::Inference`]. If their mean return is at least the validation
///       threshold, training stops.
/// 3. `number_of_tests` trials of `episodes_per_test` episodes are run in
///    [`Mode::Inference`]. The final score is the mean of the trial scores.
///
/// The training counters are owned by the experiment and updated at
/// interval boundaries only.
pub struct Experiment<E, A>
where
    E: Env,
    A: Agent<E>,
{
    name: String,
    validation_threshold: f32,
    test_threshold: f32,
    env: E,
    agent: A,
    state: ExperimentState,
    run: Option<usize>,
}

impl<E, A> Experiment<E, A>
where
    E: Env,
    A: Agent<E>,
{
    /// Constructs an experiment.
    ///
    /// * `validation_threshold` - mean validation return ending the training.
    /// * `test_threshold` - final score for the experiment to be successful.
    pub fn build(
        name: impl Into<String>,
        validation_threshold: f32,
        test_threshold: f32,
        env: E,
        agent: A,
    ) -> Self {
        Self {
            name: name.into(),
            validation_threshold,
            test_threshold,
            env,
            agent,
            state: ExperimentState::Unset,
            run: None,
        }
    }

    /// Name of the experiment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the experiment suffixed by the run number, if any.
    pub fn full_name(&self) -> String {
        match self.run {
            Some(run) => format!("{}_{}", self.name, run),
            None => self.name.clone(),
        }
    }

    /// Current phase.
    pub fn state(&self) -> ExperimentState {
        self.state
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The agent.
    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// The agent, mutably, e.g., for restoring a saved one.
    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    /// Sets up the environment, then the agent, for the given run.
    ///
    /// If the environment fails to set up, the agent is left untouched.
    /// On failure the experiment stays [`ExperimentState::Unset`] and cannot
    /// be conducted.
    pub fn setup(&mut self, run: Option<usize>) -> Result<()> {
        self.state = ExperimentState::Unset;
        self.run = run;
        let full_name = self.full_name();
        info!("{}: setting up", full_name);

        if let Err(e) = self.env.setup() {
            error!("{}: environment setup failed: {:#}", full_name, e);
            return Err(e);
        }

        let obs_space = self.env.observation_space();
        let act_space = self.env.action_space();
        if let Err(e) = self.agent.setup(&full_name, &obs_space, &act_space) {
            error!("{}: agent setup failed: {:#}", full_name, e);
            return Err(e);
        }

        self.state = ExperimentState::Setup;
        info!("{}: set up", full_name);
        Ok(())
    }

    /// Conducts the experiment, writing telemetry to `recorder`.
    ///
    /// Fails with [`GauntletError::NotSetUp`] unless [`Experiment::setup`]
    /// succeeded before. Errors of the collaborators during the run are
    /// propagated and leave the experiment [`ExperimentState::Unset`], so it
    /// has to be set up again before the next run.
    pub fn conduct(
        &mut self,
        config: &ConductConfig,
        recorder: &mut dyn Recorder,
    ) -> Result<ExperimentOutcome> {
        let full_name = self.full_name();
        if self.state == ExperimentState::Unset {
            return Err(GauntletError::NotSetUp { name: full_name }.into());
        }
        config.validate()?;
        info!("{}: conducting", full_name);

        let seed = config.seed + self.run.unwrap_or(0) as u64;
        let mut session = Session::new(full_name.clone(), seed, recorder);
        session.write(Record::from_slice(&[("start_time", DateTime(Local::now()))]));
        let result = self.run_phases(&mut session, config, &full_name);
        if let Err(e) = &result {
            error!("{}: aborted in state {:?}: {:#}", full_name, self.state, e);
            self.state = ExperimentState::Unset;
        }
        result
    }

    fn run_phases(
        &mut self,
        session: &mut Session,
        config: &ConductConfig,
        full_name: &str,
    ) -> Result<ExperimentOutcome> {
        self.env.initialize(session);
        self.agent.initialize(session);

        if self.agent.require_pre_train() {
            self.state = ExperimentState::PreTrain;
            let n = self.agent.warmup_episodes();
            info!("{}: pre-training for {} episodes", full_name, n);
            self.run_episodes(session, Mode::Warmup, n, config, Progress::default())?;
        }

        let mut training_episodes = 0;
        let mut training_steps = 0;
        let mut interval = 0;
        let mut validated = false;
        while training_episodes < config.max_training_episodes {
            self.state = ExperimentState::TrainInterval;
            let n = config
                .training_episodes_per_interval
                .min(config.max_training_episodes - training_episodes);
            info!("{}: training for {} episodes", full_name, n);
            let offset = Progress {
                absolute_step: training_steps,
                absolute_episode: training_episodes,
                ..Progress::default()
            };
            let (training_score, steps) =
                self.run_episodes(session, Mode::Train, n, config, offset)?;
            training_episodes += n;
            training_steps += steps;
            interval += 1;
            session.write(Record::from_slice(&[
                ("training_score", Scalar(training_score)),
                ("training_episodes", Scalar(training_episodes as f32)),
                ("train_steps", Scalar(training_steps as f32)),
            ]));
            self.save_agent(config, full_name, format!("interval_{}", interval));

            self.state = ExperimentState::Validate;
            let n = config.validation_episodes_per_interval;
            info!("{}: validating for {} episodes", full_name, n);
            let (validation_score, _) =
                self.run_episodes(session, Mode::Inference, n, config, Progress::default())?;
            info!(
                "{}: average score over {} episodes after {} training episodes: {}",
                full_name, n, training_episodes, validation_score
            );
            session.write(Record::from_slice(&[
                ("validation_score", Scalar(validation_score)),
                ("train_steps", Scalar(training_steps as f32)),
            ]));

            if validation_score >= self.validation_threshold {
                info!("{}: validation is successful", full_name);
                validated = true;
                break;
            }
        }
        if !validated {
            info!(
                "{}: training budget of {} episodes spent without validating",
                full_name, config.max_training_episodes
            );
        }

        self.state = ExperimentState::Test;
        let mut scores = Vec::with_capacity(config.number_of_tests);
        for test in 0..config.number_of_tests {
            let n = config.episodes_per_test;
            info!("{}: testing for {} episodes", full_name, n);
            let (score, _) =
                self.run_episodes(session, Mode::Inference, n, config, Progress::default())?;
            info!("{}: average score over {} episodes: {}", full_name, n, score);
            session.write(Record::from_slice(&[
                ("test_score", Scalar(score)),
                ("test", Scalar(test as f32)),
                ("train_steps", Scalar(training_steps as f32)),
            ]));
            scores.push(score);
        }

        let outcome = ExperimentOutcome::new(
            scores,
            training_episodes,
            training_steps,
            validated,
            self.test_threshold,
        );
        self.save_agent(config, full_name, "final".to_string());
        info!(
            "{}: final average score is {} with {} training episodes",
            full_name, outcome.final_score, outcome.training_episodes
        );
        info!("{}: best average score is {}", full_name, outcome.best_score);
        if outcome.successful {
            info!("{}: the experiment is successful", full_name);
        } else {
            info!("{}: the experiment is not successful", full_name);
        }

        self.state = ExperimentState::Done;
        Ok(outcome)
    }

    /// Runs `n_episodes` episodes in the given mode.
    ///
    /// Returns the mean episodic return and the number of steps.
    fn run_episodes(
        &mut self,
        session: &mut Session,
        mode: Mode,
        n_episodes: usize,
        config: &ConductConfig,
        offset: Progress,
    ) -> Result<(f32, usize)> {
        let render = match mode {
            Mode::Warmup => false,
            Mode::Train => config.render_training,
            Mode::Inference => match self.state {
                ExperimentState::Test => config.render_test,
                _ => config.render_validation,
            },
        };

        let mut total_return = 0f32;
        let mut n_steps = 0;
        for episode in 0..n_episodes {
            let mut obs = self.env.reset(session)?;
            let mut episode_return = 0f32;
            let mut step = 0;
            while step < config.episode_length_max {
                let act = self.agent.act(mode, session, &obs);
                let Step {
                    obs: next_obs,
                    reward,
                    is_terminated,
                    ..
                } = self.env.step(&act, session);
                if render {
                    self.env.render(session);
                }
                episode_return += reward;

                let progress = Progress {
                    step,
                    absolute_step: offset.absolute_step + n_steps,
                    episode,
                    absolute_episode: offset.absolute_episode + episode,
                };
                // A truncated episode keeps its real next observation.
                let next = if is_terminated { None } else { Some(&next_obs) };
                self.agent
                    .complete_step(mode, session, &obs, &act, reward, next, &progress)?;

                obs = next_obs;
                step += 1;
                n_steps += 1;
                if is_terminated {
                    break;
                }
            }

            let progress = Progress {
                step,
                absolute_step: offset.absolute_step + n_steps,
                episode,
                absolute_episode: offset.absolute_episode + episode,
            };
            self.agent
                .complete_episode(mode, session, episode_return, &progress)?;
            debug!(
                "{}: {} episode {} returned {} in {} steps",
                session.scope(),
                mode,
                episode,
                episode_return,
                step
            );
            total_return += episode_return;
        }

        let mean_return = if n_episodes == 0 {
            0.0
        } else {
            total_return / n_episodes as f32
        };
        Ok((mean_return, n_steps))
    }

    fn save_agent(&self, config: &ConductConfig, full_name: &str, tag: String) {
        let dir = match &config.model_dir {
            Some(model_dir) => Path::new(model_dir).join(full_name).join(tag),
            None => return,
        };
        match self.agent.save(&dir) {
            Ok(()) => info!("{}: saved the agent in {:?}", full_name, dir),
            Err(e) => warn!("{}: failed to save the agent in {:?}: {:#}", full_name, dir, e),
        }
    }

    /// Directory where the agent of the given run is saved after testing.
    pub fn final_model_dir(&self, config: &ConductConfig) -> Option<PathBuf> {
        config
            .model_dir
            .as_ref()
            .map(|d| Path::new(d).join(self.full_name()).join("final"))
    }
}
