//! Tabular action-value model.
mod base;
mod config;
pub use base::TabularModel;
pub use config::{TabularModelConfig, TdTarget};
