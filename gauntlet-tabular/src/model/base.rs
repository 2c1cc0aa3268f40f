//! Tabular action-value model.
use super::{TabularModelConfig, TdTarget};
use anyhow::Result;
use gauntlet_core::{
    record::{Record, RecordValue},
    replay_buffer::PrioritizedReplayBuffer,
    Batch, Env, GauntletError, Model, ModelUpdate, ReplayBuffer, Session, Space,
};
use log::info;
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

/// Action values of a discrete environment stored in a table.
///
/// Each sample `i` of a batch moves `Q(s, a)` by `learning_rate * w_i * delta_i`,
/// where `delta_i` is the temporal-difference error and `w_i` the importance
/// sampling weight of the sample.
pub struct TabularModel {
    config: TabularModelConfig,
    scope: String,
    q: Array2<f32>,
    buffer: PrioritizedReplayBuffer<usize, usize>,
}

impl TabularModel {
    /// Constructs the model. The table is allocated by [`Model::generate`].
    pub fn build(config: TabularModelConfig) -> Self {
        Self {
            buffer: PrioritizedReplayBuffer::build(&config.buffer),
            config,
            scope: String::new(),
            q: Array2::zeros((0, 0)),
        }
    }

    /// The action-value table, one row per observation.
    pub fn q(&self) -> &Array2<f32> {
        &self.q
    }

    fn argmax(values: ArrayView1<f32>) -> usize {
        values
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |(ix_max, v_max), (ix, &v)| {
                if v > v_max {
                    (ix, v)
                } else {
                    (ix_max, v_max)
                }
            })
            .0
    }

    /// Value of the next observation under the target policy.
    fn next_value(&self, next_obs: usize) -> f32 {
        let row = self.q.row(next_obs);
        let max = row.iter().cloned().fold(f32::MIN, f32::max);
        match self.config.target {
            TdTarget::QLearning => max,
            TdTarget::ExpectedSarsa { epsilon } => {
                let mean = row.mean().unwrap_or(0.0);
                epsilon * mean + (1.0 - epsilon) * max
            }
        }
    }

    fn path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.bin", self.scope))
    }
}

impl<E> Model<E> for TabularModel
where
    E: Env<Obs = usize, Act = usize>,
{
    type Buffer = PrioritizedReplayBuffer<usize, usize>;

    fn generate(&mut self, scope: &str, obs_space: &Space, act_space: &Space) -> Result<()> {
        if !obs_space.is_discrete() || !act_space.is_discrete() {
            return Err(GauntletError::AgentSetup(format!(
                "tabular model {} needs discrete spaces, got {:?} observations and {:?} actions",
                scope,
                obs_space.kind(),
                act_space.kind()
            ))
            .into());
        }
        self.scope = scope.to_string();
        self.q = Array2::zeros((obs_space.len(), act_space.len()));
        info!(
            "Generated tabular model {} with {} x {} action values",
            scope,
            obs_space.len(),
            act_space.len()
        );
        Ok(())
    }

    fn initialize(&mut self, session: &mut Session) {
        self.q.fill(0.0);
        self.buffer.clear();
        self.buffer.reseed(session.rng().gen());
    }

    fn best_action(&self, obs: &usize) -> usize {
        Self::argmax(self.q.row(*obs))
    }

    fn best_action_and_values(&self, obs: &usize) -> (usize, Vec<f32>) {
        let row = self.q.row(*obs);
        (Self::argmax(row), row.to_vec())
    }

    fn update(&mut self, _session: &mut Session, batch: Batch<usize, usize>) -> Result<ModelUpdate> {
        let n = batch.len();
        let lr = self.config.learning_rate;
        let gamma = self.config.discount_factor;
        let mut errors = Vec::with_capacity(n);
        let mut loss = 0f32;

        for i in 0..n {
            let (obs, act) = (batch.obs[i], batch.act[i]);
            let not_terminal = 1.0 - batch.is_terminal[i] as f32;
            let target = batch.reward[i] + gamma * self.next_value(batch.next_obs[i]) * not_terminal;
            let delta = target - self.q[[obs, act]];
            let w = batch.weight_of(i);
            self.q[[obs, act]] += lr * w * delta;
            loss += w * delta * delta;
            errors.push(delta.abs());
        }
        if n > 0 {
            loss /= n as f32;
        }

        let record = Record::from_slice(&[
            ("q_mean", RecordValue::Scalar(self.q.mean().unwrap_or(0.0))),
            (
                "td_error_max",
                RecordValue::Scalar(errors.iter().cloned().fold(0.0, f32::max)),
            ),
        ]);
        Ok(ModelUpdate {
            record,
            loss,
            errors,
        })
    }

    fn buffer(&self) -> &Self::Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Self::Buffer {
        &mut self.buffer
    }

    fn warmup_episodes(&self) -> usize {
        self.config.warmup_episodes
    }

    fn save(&self, dir: &Path) -> Result<()> {
        let path = self.path(dir);
        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, &self.q)?;
        info!("Saved action values to {:?}", path);
        Ok(())
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        let path = self.path(dir);
        let rdr = BufReader::new(File::open(&path)?);
        let q: Array2<f32> = bincode::deserialize_from(rdr)?;
        if !self.q.is_empty() && q.dim() != self.q.dim() {
            return Err(GauntletError::InvalidConfig(format!(
                "action values in {:?} have shape {:?}, expected {:?}",
                path,
                q.dim(),
                self.q.dim()
            ))
            .into());
        }
        self.q = q;
        info!("Loaded action values from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FrozenLake, FrozenLakeConfig};
    use gauntlet_core::{record::NullRecorder, replay_buffer::PerConfig};
    use tempdir::TempDir;

    type M = dyn Model<FrozenLake, Buffer = PrioritizedReplayBuffer<usize, usize>>;

    fn model(target: TdTarget) -> Result<TabularModel> {
        let config = TabularModelConfig::default()
            .target(target)
            .learning_rate(0.5)
            .discount_factor(0.9)
            .per(PerConfig::default().alpha(0.0).beta_0(1.0));
        let mut model = TabularModel::build(config);
        <TabularModel as Model<FrozenLake>>::generate(
            &mut model,
            "tql",
            &Space::discrete(3),
            &Space::discrete(2),
        )?;
        Ok(model)
    }

    fn batch(obs: usize, act: usize, reward: f32, next_obs: usize, terminal: bool) -> Batch<usize, usize> {
        Batch {
            obs: vec![obs],
            act: vec![act],
            reward: vec![reward],
            next_obs: vec![next_obs],
            is_terminal: vec![terminal as i8],
            ix_sample: None,
            weight: None,
        }
    }

    #[test]
    fn test_q_learning_update() -> Result<()> {
        let mut model = model(TdTarget::QLearning)?;
        let m: &mut M = &mut model;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);

        let update = m.update(&mut session, batch(1, 0, 1.0, 2, true))?;
        assert_eq!(update.errors, vec![1.0]);
        assert_eq!(update.loss, 1.0);
        assert_eq!(m.best_action_and_values(&1), (0, vec![0.5, 0.0]));

        // 0 --1--> 1, bootstrapped from max Q(1, .) = 0.5.
        let update = m.update(&mut session, batch(0, 1, 0.0, 1, false))?;
        assert!((update.errors[0] - 0.45).abs() < 1e-6);
        assert!((model.q()[[0, 1]] - 0.225).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_expected_sarsa_update() -> Result<()> {
        let mut model = model(TdTarget::ExpectedSarsa { epsilon: 0.5 })?;
        let m: &mut M = &mut model;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);

        m.update(&mut session, batch(1, 0, 1.0, 2, true))?;
        // Expected value of state 1: 0.5 * mean(0.5, 0) + 0.5 * 0.5 = 0.375.
        let update = m.update(&mut session, batch(0, 1, 0.0, 1, false))?;
        assert!((update.errors[0] - 0.9 * 0.375).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_weights_scale_the_step() -> Result<()> {
        let mut model = model(TdTarget::QLearning)?;
        let m: &mut M = &mut model;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        let mut b = batch(1, 1, 1.0, 2, true);
        b.weight = Some(vec![0.5]);
        let update = m.update(&mut session, b)?;
        assert_eq!(update.loss, 0.5);
        assert_eq!(model.q()[[1, 1]], 0.25);
        Ok(())
    }

    #[test]
    fn test_requires_discrete_spaces() {
        let mut model = TabularModel::build(TabularModelConfig::default());
        let m: &mut M = &mut model;
        let err = m
            .generate("tql", &Space::continuous(&[4]), &Space::discrete(2))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GauntletError>(),
            Some(GauntletError::AgentSetup(_))
        ));
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let mut model = model(TdTarget::QLearning)?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        let m: &mut M = &mut model;
        m.update(&mut session, batch(2, 1, 1.0, 0, true))?;

        let dir = TempDir::new("tabular_model")?;
        m.save(dir.path())?;
        assert!(dir.path().join("tql.bin").exists());

        let mut restored = self::model(TdTarget::QLearning)?;
        let r: &mut M = &mut restored;
        r.load(dir.path())?;
        assert_eq!(restored.q(), model.q());
        assert_eq!(restored.q()[[2, 1]], 0.5);
        Ok(())
    }

    #[test]
    fn test_initialize_clears_the_table() -> Result<()> {
        let env = FrozenLake::build(&FrozenLakeConfig::default(), 0)?;
        let mut model = TabularModel::build(TabularModelConfig::default());
        let m: &mut M = &mut model;
        m.generate("tql", &env.observation_space(), &env.action_space())?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        m.update(&mut session, batch(14, 2, 1.0, 15, true))?;
        assert!(model.q()[[14, 2]] > 0.0);

        let m: &mut M = &mut model;
        m.initialize(&mut session);
        assert!(model.q().iter().all(|&v| v == 0.0));
        assert_eq!(model.q().dim(), (16, 4));
        Ok(())
    }
}
