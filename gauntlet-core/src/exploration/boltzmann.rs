//! Boltzmann (softmax) exploration.
use super::{ExplorationPolicy, Schedule};
use crate::{Session, Space, SpaceType};
use anyhow::Result;
use rand::{distributions::WeightedIndex, Rng};
use serde::{Deserialize, Serialize};

/// Configuration of [`Boltzmann`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BoltzmannConfig {
    /// Initial temperature.
    pub temperature_max: f32,

    /// Final temperature.
    pub temperature_min: f32,

    /// Decrease of the temperature per training episode.
    pub temperature_decay: f32,
}

impl Default for BoltzmannConfig {
    fn default() -> Self {
        Self {
            temperature_max: 1.0,
            temperature_min: 0.001,
            temperature_decay: 0.001,
        }
    }
}

impl BoltzmannConfig {
    /// Sets the initial temperature.
    pub fn temperature_max(mut self, v: f32) -> Self {
        self.temperature_max = v;
        self
    }

    /// Sets the final temperature.
    pub fn temperature_min(mut self, v: f32) -> Self {
        self.temperature_min = v;
        self
    }

    /// Sets the decrease of the temperature per training episode.
    pub fn temperature_decay(mut self, v: f32) -> Self {
        self.temperature_decay = v;
        self
    }
}

/// Samples actions from the softmax of the action values at the current
/// temperature.
#[derive(Debug, Clone)]
pub struct Boltzmann {
    schedule: Schedule,
}

impl Boltzmann {
    /// Constructs the policy.
    pub fn build(config: BoltzmannConfig) -> Self {
        Self {
            schedule: Schedule::new(
                config.temperature_max,
                config.temperature_min,
                config.temperature_decay,
            ),
        }
    }

    /// Action probabilities at the current temperature.
    pub fn probs(&self, values: &[f32]) -> Vec<f32> {
        let t = self.schedule.value().max(f32::EPSILON);
        let v_max = values.iter().cloned().fold(f32::MIN, f32::max);
        let exps = values
            .iter()
            .map(|v| ((v - v_max) / t).exp())
            .collect::<Vec<_>>();
        let z = exps.iter().sum::<f32>();
        exps.iter().map(|e| e / z).collect()
    }
}

impl ExplorationPolicy for Boltzmann {
    fn name(&self) -> &str {
        "boltzmann"
    }

    fn supported_action_spaces(&self) -> &[SpaceType] {
        &[SpaceType::Discrete]
    }

    fn define(&mut self, _act_space: &Space) -> Result<()> {
        self.schedule.validate(self.name())?;
        self.schedule.reset();
        Ok(())
    }

    fn initialize(&mut self) {
        self.schedule.reset();
    }

    fn act(&self, session: &mut Session, values: &[f32], best: usize) -> usize {
        match WeightedIndex::new(self.probs(values)) {
            Ok(dist) => session.rng().sample(dist),
            Err(_) => best,
        }
    }

    fn update(&mut self) {
        self.schedule.step();
    }

    fn schedule(&self) -> f32 {
        self.schedule.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NullRecorder;

    #[test]
    fn test_probs_sharpen_as_temperature_decays() -> Result<()> {
        let mut policy = Boltzmann::build(BoltzmannConfig::default().temperature_decay(0.1));
        policy.generate(&Space::discrete(3))?;
        let values = [0.1, 0.5, 0.2];

        let p_hot = policy.probs(&values);
        assert!((p_hot.iter().sum::<f32>() - 1.0).abs() < 1e-5);

        (0..100).for_each(|_| policy.update());
        assert_eq!(policy.schedule(), 0.001);
        let p_cold = policy.probs(&values);
        assert!(p_cold[1] > p_hot[1]);
        assert!(p_cold[1] > 0.999);
        Ok(())
    }

    #[test]
    fn test_act_samples_valid_indices() -> Result<()> {
        let mut policy = Boltzmann::build(BoltzmannConfig::default());
        policy.generate(&Space::discrete(3))?;
        let before = policy.schedule();

        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 1, &mut recorder);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            counts[policy.act(&mut session, &[0.0, 2.0, 0.0], 1)] += 1;
        }
        assert!(counts[1] > counts[0] && counts[1] > counts[2]);
        assert!(counts[0] > 0 && counts[2] > 0);
        assert_eq!(policy.schedule(), before);
        Ok(())
    }

    #[test]
    fn test_rejects_continuous_actions() {
        let mut policy = Boltzmann::build(BoltzmannConfig::default());
        assert!(policy.generate(&Space::continuous(&[2])).is_err());
    }
}
