//! Scheduling the exponent of importance weights.
use crate::replay_buffer::PerConfig;
use serde::{Deserialize, Serialize};

/// Scheduler of the exponent of importance sampling weights.
///
/// $\beta$ grows linearly with the number of priority updates and stays at
/// `beta_final` once it gets there.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct IwScheduler {
    /// Initial value of $\beta$.
    pub beta_0: f32,

    /// Final value of $\beta$.
    pub beta_final: f32,

    /// Increment of $\beta$ per update.
    pub beta_increment: f32,

    /// Number of priority updates so far.
    pub n_updates: usize,
}

impl IwScheduler {
    /// Creates a scheduler.
    pub fn new(beta_0: f32, beta_final: f32, beta_increment: f32) -> Self {
        Self {
            beta_0,
            beta_final,
            beta_increment,
            n_updates: 0,
        }
    }

    /// Current exponent of importance sampling weights.
    pub fn beta(&self) -> f32 {
        let beta = self.beta_0 + self.beta_increment * self.n_updates as f32;
        beta.min(self.beta_final)
    }

    /// Counts a priority update.
    pub fn add_n_updates(&mut self) {
        self.n_updates += 1;
    }

    /// Restarts the schedule.
    pub fn reset(&mut self) {
        self.n_updates = 0;
    }
}

impl From<&PerConfig> for IwScheduler {
    fn from(config: &PerConfig) -> Self {
        Self::new(config.beta_0, config.beta_final, config.beta_increment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_is_capped() {
        let mut scheduler = IwScheduler::new(0.4, 1.0, 0.25);
        assert_eq!(scheduler.beta(), 0.4);
        scheduler.add_n_updates();
        assert!((scheduler.beta() - 0.65).abs() < 1e-6);
        (0..10).for_each(|_| scheduler.add_n_updates());
        assert_eq!(scheduler.beta(), 1.0);
        scheduler.reset();
        assert_eq!(scheduler.beta(), 0.4);
    }
}
