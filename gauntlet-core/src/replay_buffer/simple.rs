//! Replay buffer with uniform sampling.
use super::SimpleReplayBufferConfig;
use crate::{Batch, GauntletError, ReplayBuffer, Transition};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A ring buffer of transitions sampled uniformly with replacement.
pub struct SimpleReplayBuffer<O, A> {
    capacity: usize,

    /// Next insertion index.
    i: usize,

    data: Vec<Transition<O, A>>,
    rng: StdRng,
}

impl<O: Clone, A: Clone> SimpleReplayBuffer<O, A> {
    /// Capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The transition stored at `ix`.
    pub fn transition(&self, ix: usize) -> Option<&Transition<O, A>> {
        self.data.get(ix)
    }

    /// Writes a transition into the ring and returns its index.
    pub(super) fn insert(&mut self, tr: Transition<O, A>) -> usize {
        let ix = self.i;
        if self.data.len() < self.capacity {
            self.data.push(tr);
        } else {
            self.data[ix] = tr;
        }
        self.i = (self.i + 1) % self.capacity;
        ix
    }

    /// Collects the transitions at the given indices into a batch.
    pub(super) fn collect(&self, ixs: Vec<usize>, weight: Option<Vec<f32>>) -> Batch<O, A> {
        let n = ixs.len();
        let mut batch = Batch {
            obs: Vec::with_capacity(n),
            act: Vec::with_capacity(n),
            reward: Vec::with_capacity(n),
            next_obs: Vec::with_capacity(n),
            is_terminal: Vec::with_capacity(n),
            ix_sample: None,
            weight,
        };
        for &ix in ixs.iter() {
            let tr = &self.data[ix];
            batch.obs.push(tr.obs.clone());
            batch.act.push(tr.act.clone());
            batch.reward.push(tr.reward);
            batch.next_obs.push(tr.next_obs.clone());
            batch.is_terminal.push(tr.is_terminal as i8);
        }
        batch.ix_sample = Some(ixs);
        batch
    }

    pub(super) fn check_len(&self, size: usize) -> Result<()> {
        if size > self.data.len() {
            return Err(GauntletError::BufferUnderflow {
                requested: size,
                available: self.data.len(),
            }
            .into());
        }
        Ok(())
    }
}

impl<O: Clone, A: Clone> ReplayBuffer for SimpleReplayBuffer<O, A> {
    type Config = SimpleReplayBufferConfig;
    type Obs = O;
    type Act = A;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            capacity,
            i: 0,
            data: Vec::with_capacity(capacity),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn store(&mut self, tr: Transition<O, A>) -> Result<()> {
        self.insert(tr);
        Ok(())
    }

    fn get(&mut self, size: usize) -> Result<Batch<O, A>> {
        self.check_len(size)?;
        let n = self.data.len();
        let ixs = (0..size).map(|_| self.rng.gen_range(0..n)).collect();
        Ok(self.collect(ixs, None))
    }

    fn update(&mut self, _errors: &[f32]) {}

    fn len(&self) -> usize {
        self.data.len()
    }

    fn clear(&mut self) {
        self.data.clear();
        self.i = 0;
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
