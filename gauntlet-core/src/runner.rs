//! Repeated and parallel runs of experiments.
use crate::{
    experiment::{ConductConfig, Experiment, ExperimentOutcome},
    record::Recorder,
    Agent, Env,
};
use anyhow::{anyhow, Result};
use crossbeam_channel::unbounded;
use log::{error, info};

/// Outcomes of the runs of an experiment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// Name of the experiment.
    pub name: String,

    /// Outcomes of the runs that were set up successfully, in run order.
    pub outcomes: Vec<ExperimentOutcome>,

    /// Number of runs whose setup failed.
    pub n_failed_setups: usize,
}

impl Summary {
    /// Mean of the final scores.
    pub fn mean_final_score(&self) -> Option<f32> {
        self.mean(|o| o.final_score)
    }

    /// Largest final score.
    pub fn max_final_score(&self) -> Option<f32> {
        self.outcomes
            .iter()
            .map(|o| o.final_score)
            .fold(None, |m, v| Some(m.map_or(v, |m: f32| m.max(v))))
    }

    /// Mean number of training episodes.
    pub fn mean_training_episodes(&self) -> Option<f32> {
        self.mean(|o| o.training_episodes as f32)
    }

    /// Number of successful runs.
    pub fn n_successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.successful).count()
    }

    fn mean(&self, f: impl Fn(&ExperimentOutcome) -> f32) -> Option<f32> {
        if self.outcomes.is_empty() {
            None
        } else {
            Some(self.outcomes.iter().map(f).sum::<f32>() / self.outcomes.len() as f32)
        }
    }
}

/// Sets up and conducts an experiment for runs `0..iterations`.
///
/// Runs failing to set up are logged and skipped. Errors raised while
/// conducting a run are returned.
pub fn run_iterations<E, A>(
    experiment: &mut Experiment<E, A>,
    config: &ConductConfig,
    iterations: usize,
    recorder: &mut dyn Recorder,
) -> Result<Summary>
where
    E: Env,
    A: Agent<E>,
{
    let mut summary = Summary {
        name: experiment.name().to_string(),
        ..Summary::default()
    };

    for run in 0..iterations {
        if let Err(e) = experiment.setup(Some(run)) {
            error!("{}: skipping run {}: {:#}", experiment.name(), run, e);
            summary.n_failed_setups += 1;
            continue;
        }
        let outcome = experiment.conduct(config, recorder)?;
        summary.outcomes.push(outcome);
    }

    match (summary.mean_final_score(), summary.max_final_score()) {
        (Some(mean), Some(max)) => info!(
            "{}: {} successful runs out of {}, average final score {}, best final score {}",
            summary.name,
            summary.n_successful(),
            iterations,
            mean,
            max
        ),
        _ => info!("{}: no run was conducted", summary.name),
    }
    Ok(summary)
}

/// An experiment to run on its own thread.
///
/// The closure owns everything the experiment uses, so that nothing is
/// shared with the other jobs.
pub struct ParallelJob {
    name: String,
    job: Box<dyn FnOnce() -> Result<Summary> + Send>,
}

impl ParallelJob {
    /// Creates a job.
    pub fn new<F>(name: impl Into<String>, job: F) -> Self
    where
        F: FnOnce() -> Result<Summary> + Send + 'static,
    {
        Self {
            name: name.into(),
            job: Box::new(job),
        }
    }

    /// Name of the job.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Runs jobs on separate threads and collects their results in job order.
///
/// A failing or panicking job does not affect the others.
pub fn run_parallel(jobs: Vec<ParallelJob>) -> Vec<(String, Result<Summary>)> {
    let (s, r) = unbounded();
    let names = jobs.iter().map(|j| j.name.clone()).collect::<Vec<_>>();

    let handles = jobs
        .into_iter()
        .enumerate()
        .map(|(ix, ParallelJob { name, job })| {
            let s = s.clone();
            std::thread::spawn(move || {
                info!("Started job {}", name);
                let result = job();
                // The receiver outlives every job.
                let _ = s.send((ix, result));
            })
        })
        .collect::<Vec<_>>();
    drop(s);

    let mut results = names
        .iter()
        .map(|_| None)
        .collect::<Vec<Option<Result<Summary>>>>();
    for (ix, result) in r.iter() {
        results[ix] = Some(result);
    }
    for h in handles {
        let _ = h.join();
    }

    names
        .into_iter()
        .zip(results)
        .map(|(name, result)| {
            let result = result.unwrap_or_else(|| Err(anyhow!("Job {} panicked", name)));
            (name, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(final_score: f32, training_episodes: usize, successful: bool) -> ExperimentOutcome {
        ExperimentOutcome {
            final_score,
            best_score: final_score,
            training_episodes,
            training_steps: 0,
            validated: true,
            successful,
            scores: vec![final_score],
        }
    }

    #[test]
    fn test_summary_statistics() {
        let summary = Summary {
            name: "test".to_string(),
            outcomes: vec![outcome(0.5, 100, false), outcome(0.9, 300, true)],
            n_failed_setups: 1,
        };
        assert!((summary.mean_final_score().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(summary.max_final_score(), Some(0.9));
        assert_eq!(summary.mean_training_episodes(), Some(200.0));
        assert_eq!(summary.n_successful(), 1);
        assert_eq!(Summary::default().mean_final_score(), None);
    }

    #[test]
    fn test_parallel_jobs_are_isolated() {
        let jobs = vec![
            ParallelJob::new("ok", || {
                Ok(Summary {
                    name: "ok".to_string(),
                    ..Summary::default()
                })
            }),
            ParallelJob::new("failing", || Err(anyhow!("broken"))),
            ParallelJob::new("panicking", || panic!("boom")),
        ];
        let results = run_parallel(jobs);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "ok");
        assert_eq!(results[0].1.as_ref().unwrap().name, "ok");
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_err());
    }
}
