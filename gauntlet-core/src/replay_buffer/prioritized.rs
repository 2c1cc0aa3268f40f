//! Replay buffer with proportional prioritized sampling.
mod iw_scheduler;
mod sum_tree;
use super::{PrioritizedReplayBufferConfig, SimpleReplayBuffer};
use crate::{Batch, ReplayBuffer, Transition};
use anyhow::Result;
use log::trace;
use rand::{rngs::StdRng, SeedableRng};
pub use iw_scheduler::IwScheduler;
use sum_tree::SumTree;

/// A replay buffer sampling transitions in proportion to their priority.
///
/// A transition with absolute error `e` gets the priority `(e + eps)^alpha`.
/// Newly stored transitions get the largest priority seen so far, so that
/// each of them is likely to be sampled at least once. Batches carry
/// importance sampling weights.
pub struct PrioritizedReplayBuffer<O, A> {
    buffer: SimpleReplayBuffer<O, A>,
    sum_tree: SumTree,
    iw_scheduler: IwScheduler,
    alpha: f32,
    eps: f32,
    rng: StdRng,

    /// Indices of the latest sampled batch.
    last_ixs: Vec<usize>,
}

impl<O: Clone, A: Clone> PrioritizedReplayBuffer<O, A> {
    /// Priority of the transition at `ix`.
    pub fn priority(&self, ix: usize) -> f32 {
        self.sum_tree.priority(ix)
    }

    /// Current exponent of importance sampling weights.
    pub fn beta(&self) -> f32 {
        self.iw_scheduler.beta()
    }

    /// The transition stored at `ix`.
    pub fn transition(&self, ix: usize) -> Option<&Transition<O, A>> {
        self.buffer.transition(ix)
    }
}

impl<O: Clone, A: Clone> ReplayBuffer for PrioritizedReplayBuffer<O, A> {
    type Config = PrioritizedReplayBufferConfig;
    type Obs = O;
    type Act = A;

    fn build(config: &Self::Config) -> Self {
        let buffer = SimpleReplayBuffer::build(&config.buffer);
        Self {
            sum_tree: SumTree::new(buffer.capacity()),
            buffer,
            iw_scheduler: IwScheduler::from(&config.per),
            alpha: config.per.alpha,
            eps: config.per.eps,
            rng: StdRng::seed_from_u64(config.buffer.seed),
            last_ixs: vec![],
        }
    }

    fn store(&mut self, tr: Transition<O, A>) -> Result<()> {
        let p = self.sum_tree.max();
        let ix = self.buffer.insert(tr);
        self.sum_tree.add(ix, p);
        Ok(())
    }

    fn get(&mut self, size: usize) -> Result<Batch<O, A>> {
        self.buffer.check_len(size)?;
        let beta = self.iw_scheduler.beta();
        let (ixs, ws) = self.sum_tree.sample(size, beta, &mut self.rng);
        self.last_ixs = ixs.clone();
        Ok(self.buffer.collect(ixs, Some(ws)))
    }

    fn update(&mut self, errors: &[f32]) {
        debug_assert_eq!(errors.len(), self.last_ixs.len());
        for (&ix, &e) in self.last_ixs.iter().zip(errors.iter()) {
            let p = (e.abs() + self.eps).powf(self.alpha);
            self.sum_tree.update(ix, p);
        }
        self.iw_scheduler.add_n_updates();
        trace!(
            "Updated {} priorities, beta = {}",
            self.last_ixs.len(),
            self.iw_scheduler.beta()
        );
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.sum_tree.clear();
        self.iw_scheduler.reset();
        self.last_ixs.clear();
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
