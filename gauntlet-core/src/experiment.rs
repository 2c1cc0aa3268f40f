//! Experiment loop.
mod base;
mod config;
mod outcome;
pub use base::{Experiment, ExperimentState};
pub use config::ConductConfig;
pub use outcome::ExperimentOutcome;
