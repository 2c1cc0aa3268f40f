//! Transitions and batches of transitions.

/// A transition `(o_t, a_t, r_t, o_t+1, terminal_t)`.
///
/// For terminal transitions `next_obs` holds the sentinel of the observation
/// space, see [`Obs::sentinel`](crate::Obs::sentinel).
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<O, A> {
    /// Observation `o_t`.
    pub obs: O,

    /// Action `a_t`.
    pub act: A,

    /// Reward `r_t`.
    pub reward: f32,

    /// Next observation `o_t+1`.
    pub next_obs: O,

    /// Flag denoting if `o_t+1` is terminal.
    pub is_terminal: bool,
}

/// A batch of transitions sampled from a replay buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<O, A> {
    /// Observations `o_t`.
    pub obs: Vec<O>,

    /// Actions `a_t`.
    pub act: Vec<A>,

    /// Rewards `r_t`.
    pub reward: Vec<f32>,

    /// Next observations `o_t+1`.
    pub next_obs: Vec<O>,

    /// Terminal flags, `1` for terminal transitions.
    pub is_terminal: Vec<i8>,

    /// Buffer indices of the samples.
    pub ix_sample: Option<Vec<usize>>,

    /// Importance sampling weights, present for prioritized buffers.
    pub weight: Option<Vec<f32>>,
}

impl<O, A> Batch<O, A> {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch holds no transition.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }

    /// Weight of the `i`-th sample, `1` when the batch is unweighted.
    pub fn weight_of(&self, i: usize) -> f32 {
        self.weight.as_ref().map_or(1.0, |w| w[i])
    }
}
