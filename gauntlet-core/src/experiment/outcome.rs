//! Outcome of a conducted experiment.
use serde::{Deserialize, Serialize};

/// Outcome of [`Experiment::conduct`](super::Experiment::conduct).
///
/// Missing a threshold is part of the outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentOutcome {
    /// Mean of the test trial scores.
    pub final_score: f32,

    /// Best test trial score.
    pub best_score: f32,

    /// Number of training episodes run.
    pub training_episodes: usize,

    /// Number of training steps run.
    pub training_steps: usize,

    /// `true` if a validation score reached the validation threshold.
    pub validated: bool,

    /// `true` if the final score reached the test threshold.
    pub successful: bool,

    /// Mean episodic return of each test trial.
    pub scores: Vec<f32>,
}

impl ExperimentOutcome {
    /// Aggregates the scores of the test trials.
    ///
    /// Every trial weighs the same, whatever its number of episodes.
    pub fn new(
        scores: Vec<f32>,
        training_episodes: usize,
        training_steps: usize,
        validated: bool,
        test_threshold: f32,
    ) -> Self {
        let final_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f32>() / scores.len() as f32
        };
        let best_score = scores.iter().cloned().fold(f32::MIN, f32::max);
        Self {
            final_score,
            best_score,
            training_episodes,
            training_steps,
            validated,
            successful: final_score >= test_threshold,
            scores,
        }
    }

    /// `(final_score, best_score, training_episodes)`.
    pub fn as_tuple(&self) -> (f32, f32, usize) {
        (self.final_score, self.best_score, self.training_episodes)
    }
}
