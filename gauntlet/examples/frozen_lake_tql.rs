use anyhow::Result;
use clap::Parser;
use gauntlet_core::{
    experiment::{ConductConfig, Experiment},
    exploration::{
        BoltzmannConfig, DirichletConfig, EpsilonGreedyConfig, Explorer, ExplorerConfig,
    },
    record::{NullRecorder, Recorder},
    replay_buffer::PerConfig,
    runner::{run_iterations, run_parallel, ParallelJob, Summary},
    td_agent::{TdAgent, TdAgentConfig},
    Env as _,
};
use gauntlet_tabular::{FrozenLake, FrozenLakeConfig, TabularModel, TabularModelConfig};
use gauntlet_tensorboard::TensorboardRecorder;
use log::{error, info};
use std::path::Path;

// Mean return over 100 episodes regarded as solving the slippery lake.
const SUCCESS_THRESHOLD: f32 = 0.78;
const LEARNING_RATE: f32 = 0.001;
const DISCOUNT_FACTOR: f32 = 0.99;
const BUFFER_CAPACITY: usize = 1000;
const WARMUP_EPISODES: usize = 100;
const BATCH_SIZE: usize = 100;
const TRAINING_EPISODES: usize = 100;
const VALIDATION_EPISODES: usize = 100;
const MAX_TRAINING_EPISODES: usize = 10000;
const TESTING_EPISODES: usize = 100;
const TEST_CYCLES: usize = 10;
const EPISODE_LENGTH_MAX: usize = 100;

type Agent = TdAgent<FrozenLake, TabularModel, Explorer>;

/// Compare exploration policies of tabular Q-learning on the frozen lake
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Args {
    /// Number of runs of each experiment
    #[arg(short, long, default_value_t = 1)]
    iterations: usize,

    /// Base random seed, incremented for each run
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Whether the lake is slippery
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    slippery: bool,

    /// Directory where agents are saved
    #[arg(long)]
    model_dir: Option<String>,

    /// Directory of TensorBoard event files
    #[arg(long)]
    tensorboard_dir: Option<String>,

    /// Render the environment during testing
    #[arg(long, default_value_t = false)]
    render_test: bool,
}

fn explorers() -> Vec<(&'static str, ExplorerConfig)> {
    vec![
        (
            "experiment_epsilon_greedy",
            ExplorerConfig::EpsilonGreedy(
                EpsilonGreedyConfig::default()
                    .exploration_rate_max(1.0)
                    .exploration_rate_min(0.001)
                    .exploration_rate_decay(0.001),
            ),
        ),
        (
            "experiment_boltzmann",
            ExplorerConfig::Boltzmann(
                BoltzmannConfig::default()
                    .temperature_max(1.0)
                    .temperature_min(0.001)
                    .temperature_decay(0.001),
            ),
        ),
        (
            "experiment_dirichlet",
            ExplorerConfig::Dirichlet(DirichletConfig::from_trade_off(1.0, 0.5, 1.0, 0.001)),
        ),
    ]
}

fn conduct_config(args: &Args) -> ConductConfig {
    let config = ConductConfig::default()
        .training_episodes_per_interval(TRAINING_EPISODES)
        .validation_episodes_per_interval(VALIDATION_EPISODES)
        .max_training_episodes(MAX_TRAINING_EPISODES)
        .episodes_per_test(TESTING_EPISODES)
        .number_of_tests(TEST_CYCLES)
        .episode_length_max(EPISODE_LENGTH_MAX)
        .render(false, false, args.render_test)
        .seed(args.seed);
    match &args.model_dir {
        Some(model_dir) => config.model_dir(model_dir.as_str()),
        None => config,
    }
}

fn create_experiment(
    name: &str,
    explorer_config: ExplorerConfig,
    args: &Args,
) -> Result<Experiment<FrozenLake, Agent>> {
    let env_config = FrozenLakeConfig::default().is_slippery(args.slippery);
    let env = FrozenLake::build(&env_config, args.seed)?;
    let model = TabularModel::build(
        TabularModelConfig::default()
            .learning_rate(LEARNING_RATE)
            .discount_factor(DISCOUNT_FACTOR)
            .warmup_episodes(WARMUP_EPISODES)
            .buffer_capacity(BUFFER_CAPACITY)
            .per(PerConfig::default().eps(0.01).alpha(0.6))
            .seed(args.seed),
    );
    let agent = TdAgent::build(
        TdAgentConfig::default().name("tql_agent").batch_size(BATCH_SIZE),
        model,
        Explorer::build(explorer_config),
    );
    Ok(Experiment::build(
        name,
        SUCCESS_THRESHOLD,
        SUCCESS_THRESHOLD,
        env,
        agent,
    ))
}

fn create_recorder(name: &str, args: &Args) -> Box<dyn Recorder> {
    match &args.tensorboard_dir {
        Some(dir) => Box::new(TensorboardRecorder::new(Path::new(dir).join(name))),
        None => Box::new(NullRecorder::default()),
    }
}

fn run(args: &Args, config: &ConductConfig) -> Vec<(String, Result<Summary>)> {
    let jobs = explorers()
        .into_iter()
        .map(|(name, explorer_config)| {
            let args = args.clone();
            let config = config.clone();
            ParallelJob::new(name, move || {
                let mut experiment = create_experiment(name, explorer_config, &args)?;
                let mut recorder = create_recorder(name, &args);
                run_iterations(&mut experiment, &config, args.iterations, recorder.as_mut())
            })
        })
        .collect();
    run_parallel(jobs)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = conduct_config(&args);

    for (name, result) in run(&args, &config) {
        match result {
            Ok(summary) => info!(
                "{}: {}/{} runs successful, average final score {:?}, average training episodes {:?}, failed setups {}",
                name,
                summary.n_successful(),
                summary.outcomes.len(),
                summary.mean_final_score(),
                summary.mean_training_episodes(),
                summary.n_failed_setups
            ),
            Err(e) => error!("{}: {:#}", name, e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_frozen_lake_tql() -> Result<()> {
        let tmp_dir = TempDir::new("frozen_lake_tql")?;
        let model_dir = tmp_dir.path().join("model");
        let tensorboard_dir = tmp_dir.path().join("tensorboard");
        let args = Args {
            iterations: 2,
            seed: 0,
            slippery: true,
            model_dir: Some(model_dir.to_string_lossy().to_string()),
            tensorboard_dir: Some(tensorboard_dir.to_string_lossy().to_string()),
            render_test: false,
        };
        let config = conduct_config(&args)
            .training_episodes_per_interval(10)
            .validation_episodes_per_interval(5)
            .max_training_episodes(20)
            .episodes_per_test(5)
            .number_of_tests(2);

        let results = run(&args, &config);
        assert_eq!(results.len(), 3);
        for (name, result) in results {
            let summary = result?;
            assert_eq!(summary.name, name);
            assert_eq!(summary.outcomes.len(), 2);
            assert_eq!(summary.n_failed_setups, 0);
            for run in 0..2 {
                let dir = model_dir.join(format!("{}_{}", name, run)).join("final");
                assert!(dir.join("tql_agent.bin").exists());
            }
        }
        Ok(())
    }
}
