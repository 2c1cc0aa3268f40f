//! Temporal-difference agent.
mod base;
mod config;
pub use base::TdAgent;
pub use config::TdAgentConfig;
