//! Errors in the library.
use crate::SpaceType;
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum GauntletError {
    /// The exploration policy cannot act on the given action space.
    #[error("Exploration policy {policy} does not support {space:?} action spaces")]
    UnsupportedActionSpace {
        /// Name of the exploration policy.
        policy: String,

        /// Type of the rejected action space.
        space: SpaceType,
    },

    /// The environment failed to set up.
    #[error("Environment setup failed: {0}")]
    EnvSetup(String),

    /// The agent, its model or its exploration policy failed to set up.
    #[error("Agent setup failed: {0}")]
    AgentSetup(String),

    /// `conduct` was called on an experiment without a successful `setup`.
    #[error("Experiment {name} is not set up")]
    NotSetUp {
        /// Name of the experiment.
        name: String,
    },

    /// More transitions were requested from a buffer than it holds.
    #[error("Cannot sample {requested} transitions from a buffer holding {available}")]
    BufferUnderflow {
        /// Requested batch size.
        requested: usize,

        /// Number of stored transitions.
        available: usize,
    },

    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
