use crate::{GauntletError, Session, Space, SpaceType};
use anyhow::Result;
use log::info;

/// A scalar decaying additively from `max` to `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    /// Starting value.
    pub max: f32,

    /// Floor of the value.
    pub min: f32,

    /// Decrement per step.
    pub decay: f32,

    value: f32,
}

impl Schedule {
    /// Creates a schedule starting at `max`.
    pub fn new(max: f32, min: f32, decay: f32) -> Self {
        Self {
            max,
            min,
            decay,
            value: max,
        }
    }

    /// Fails unless `0 <= min <= max` and `decay >= 0`.
    pub fn validate(&self, name: &str) -> Result<()> {
        let valid = self.min >= 0.0 && self.min <= self.max && self.decay >= 0.0;
        if !valid {
            return Err(GauntletError::InvalidConfig(format!(
                "schedule of {} (max = {}, min = {}, decay = {})",
                name, self.max, self.min, self.decay
            ))
            .into());
        }
        Ok(())
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Resets the value to `max`.
    pub fn reset(&mut self) {
        self.value = self.max;
    }

    /// Decreases the value by `decay`, not going below `min`.
    pub fn step(&mut self) {
        self.value = (self.value - self.decay).max(self.min);
    }
}

/// Turns action value estimates into the action taken in training.
///
/// `act` must leave the schedule untouched; only `update` advances it.
pub trait ExplorationPolicy {
    /// Name of the policy.
    fn name(&self) -> &str;

    /// Types of action spaces the policy can act on.
    fn supported_action_spaces(&self) -> &[SpaceType];

    /// Allocates the state of the policy for the given action space.
    fn define(&mut self, act_space: &Space) -> Result<()>;

    /// Checks the action space and defines the policy.
    fn generate(&mut self, act_space: &Space) -> Result<()> {
        info!("Generating exploration policy {}", self.name());
        if !self.supported_action_spaces().contains(&act_space.kind()) {
            return Err(GauntletError::UnsupportedActionSpace {
                policy: self.name().to_string(),
                space: act_space.kind(),
            }
            .into());
        }
        self.define(act_space)
    }

    /// Resets the schedule to its maximum.
    fn initialize(&mut self);

    /// Selects an action index given the values of all actions and the greedy one.
    fn act(&self, session: &mut Session, values: &[f32], best: usize) -> usize;

    /// Advances the schedule by one step.
    fn update(&mut self);

    /// Current value of the schedule.
    fn schedule(&self) -> f32;
}
