//! Core functionalities.
mod agent;
mod batch;
mod env;
mod model;
mod replay_buffer;
pub use agent::{Agent, Mode, Progress};
pub use batch::{Batch, Transition};
pub use env::{Env, Step};
pub use model::{Model, ModelUpdate};
pub use replay_buffer::ReplayBuffer;

use crate::Space;
use ndarray::{ArrayD, IxDyn};
use rand::{rngs::StdRng, Rng};
use std::fmt::Debug;

/// An observation of an environment.
pub trait Obs: Clone + Debug {
    /// Returns the placeholder stored as the next observation of a terminal
    /// transition.
    ///
    /// Replay buffers are dense, so a terminal transition still needs a
    /// next observation of the right type and shape.
    fn sentinel(space: &Space) -> Self;
}

impl Obs for usize {
    fn sentinel(_space: &Space) -> Self {
        0
    }
}

impl Obs for ArrayD<f32> {
    fn sentinel(space: &Space) -> Self {
        ArrayD::zeros(IxDyn(space.shape()))
    }
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Samples a uniformly random valid action of the given space.
    fn random(space: &Space, rng: &mut StdRng) -> Self;
}

/// An action taken from a discrete action space.
///
/// Exploration policies select action indices, so agents driven by an
/// exploration policy act on discrete actions.
pub trait DiscreteAct: Act {
    /// Index of the action.
    fn index(&self) -> usize;

    /// Action of the given index.
    fn from_index(ix: usize) -> Self;
}

impl Act for usize {
    fn random(space: &Space, rng: &mut StdRng) -> Self {
        rng.gen_range(0..space.len().max(1))
    }
}

impl DiscreteAct for usize {
    fn index(&self) -> usize {
        *self
    }

    fn from_index(ix: usize) -> Self {
        ix
    }
}

impl Act for ArrayD<f32> {
    /// Each component is drawn uniformly from `[-1, 1)`.
    fn random(space: &Space, rng: &mut StdRng) -> Self {
        ArrayD::from_shape_fn(IxDyn(space.shape()), |_| rng.gen_range(-1.0..1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_discrete_sentinel_is_zero() {
        assert_eq!(<usize as Obs>::sentinel(&Space::discrete(16)), 0);
    }

    #[test]
    fn test_continuous_sentinel_is_zero_tensor() {
        let sentinel = <ArrayD<f32> as Obs>::sentinel(&Space::continuous(&[3]));
        assert_eq!(sentinel.shape(), &[3]);
        assert!(sentinel.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_random_actions_are_valid() {
        let mut rng = StdRng::seed_from_u64(0);
        let space = Space::discrete(4);
        for _ in 0..100 {
            assert!(<usize as Act>::random(&space, &mut rng) < 4);
        }
        let act = <ArrayD<f32> as Act>::random(&Space::continuous(&[2, 2]), &mut rng);
        assert_eq!(act.shape(), &[2, 2]);
        assert!(act.iter().all(|v| (-1.0..1.0).contains(v)));
    }
}
