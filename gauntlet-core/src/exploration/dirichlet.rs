//! Dirichlet exploration.
use super::{ExplorationPolicy, Schedule};
use crate::{GauntletError, Session, Space, SpaceType};
use anyhow::Result;
use rand::{distributions::WeightedIndex, Rng};
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

/// Configuration of [`Dirichlet`].
///
/// The exploration weight `w` moves from `weight_max` down to `weight_min`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DirichletConfig {
    /// Concentration parameter, shared by all actions.
    pub alpha: f32,

    /// Initial exploration weight.
    pub weight_max: f32,

    /// Final exploration weight.
    pub weight_min: f32,

    /// Decrease of the exploration weight per training episode.
    pub weight_decay: f32,
}

impl Default for DirichletConfig {
    fn default() -> Self {
        Self::from_trade_off(1.0, 0.5, 1.0, 0.001)
    }
}

impl DirichletConfig {
    /// Configuration from the trust put in the model.
    ///
    /// The trust grows from `trade_off_min` to `trade_off_max` by
    /// `trade_off_update` per training episode; the exploration weight is
    /// `1 - trust`.
    pub fn from_trade_off(
        alpha: f32,
        trade_off_min: f32,
        trade_off_max: f32,
        trade_off_update: f32,
    ) -> Self {
        Self {
            alpha,
            weight_max: 1.0 - trade_off_min,
            weight_min: 1.0 - trade_off_max,
            weight_decay: trade_off_update,
        }
    }

    /// Sets the concentration parameter.
    pub fn alpha(mut self, v: f32) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the initial exploration weight.
    pub fn weight_max(mut self, v: f32) -> Self {
        self.weight_max = v;
        self
    }

    /// Sets the final exploration weight.
    pub fn weight_min(mut self, v: f32) -> Self {
        self.weight_min = v;
        self
    }

    /// Sets the decrease of the exploration weight per training episode.
    pub fn weight_decay(mut self, v: f32) -> Self {
        self.weight_decay = v;
        self
    }
}

/// Samples actions from the greedy action perturbed by Dirichlet noise.
///
/// At each step a probability vector `d ~ Dir(alpha, ..., alpha)` is drawn
/// and the action is sampled from `(1 - w) onehot(best) + w d`.
#[derive(Debug, Clone)]
pub struct Dirichlet {
    alpha: f32,
    schedule: Schedule,
    dist: Option<rand_distr::Dirichlet<f64>>,
}

impl Dirichlet {
    /// Constructs the policy.
    pub fn build(config: DirichletConfig) -> Self {
        Self {
            alpha: config.alpha,
            schedule: Schedule::new(config.weight_max, config.weight_min, config.weight_decay),
            dist: None,
        }
    }
}

impl ExplorationPolicy for Dirichlet {
    fn name(&self) -> &str {
        "dirichlet"
    }

    fn supported_action_spaces(&self) -> &[SpaceType] {
        &[SpaceType::Discrete]
    }

    fn define(&mut self, act_space: &Space) -> Result<()> {
        self.schedule.validate(self.name())?;
        if self.schedule.max > 1.0 || self.alpha <= 0.0 {
            return Err(GauntletError::InvalidConfig(format!(
                "dirichlet policy needs alpha > 0 and weights in [0, 1] (alpha = {}, weight_max = {})",
                self.alpha, self.schedule.max
            ))
            .into());
        }

        // A single action leaves nothing to explore.
        self.dist = match act_space.len() {
            0 | 1 => None,
            n => Some(rand_distr::Dirichlet::new_with_size(self.alpha as f64, n)?),
        };
        self.schedule.reset();
        Ok(())
    }

    fn initialize(&mut self) {
        self.schedule.reset();
    }

    fn act(&self, session: &mut Session, _values: &[f32], best: usize) -> usize {
        let dist = match &self.dist {
            Some(dist) => dist,
            None => return best,
        };
        let w = self.schedule.value() as f64;
        let noise: Vec<f64> = dist.sample(session.rng());
        let probs = noise
            .iter()
            .enumerate()
            .map(|(ix, d)| w * d + if ix == best { 1.0 - w } else { 0.0 });
        match WeightedIndex::new(probs) {
            Ok(weighted) => session.rng().sample(weighted),
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
    fn test_trade_off_maps_to_weight() {
        let config = DirichletConfig::from_trade_off(1.0, 0.5, 1.0, 0.001);
        assert_eq!(config.weight_max, 0.5);
        assert_eq!(config.weight_min, 0.0);
        assert_eq!(config.weight_decay, 0.001);
    }

    #[test]
    fn test_weight_stays_in_bounds() -> Result<()> {
        let mut policy = Dirichlet::build(DirichletConfig::default());
        policy.generate(&Space::discrete(4))?;
        assert_eq!(policy.schedule(), 0.5);
        for _ in 0..1000 {
            policy.update();
            assert!((0.0..=0.5).contains(&policy.schedule()));
        }
        assert_eq!(policy.schedule(), 0.0);
        Ok(())
    }

    #[test]
    fn test_zero_weight_is_greedy() -> Result<()> {
        let config = DirichletConfig::default().weight_max(0.0);
        let mut policy = Dirichlet::build(config);
        policy.generate(&Space::discrete(4))?;

        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 5, &mut recorder);
        assert!((0..100).all(|_| policy.act(&mut session, &[0.0; 4], 3) == 3));
        Ok(())
    }

    #[test]
    fn test_full_weight_explores() -> Result<()> {
        let config = DirichletConfig::default().weight_max(1.0);
        let mut policy = Dirichlet::build(config);
        policy.generate(&Space::discrete(4))?;

        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 5, &mut recorder);
        let n_other = (0..200)
            .filter(|_| policy.act(&mut session, &[0.0; 4], 0) != 0)
            .count();
        assert!(n_other > 50);
        assert_eq!(policy.schedule(), 1.0);
        Ok(())
    }

    #[test]
    fn test_rejects_continuous_actions() {
        let mut policy = Dirichlet::build(DirichletConfig::default());
        assert!(policy.generate(&Space::continuous(&[2])).is_err());
    }
}
