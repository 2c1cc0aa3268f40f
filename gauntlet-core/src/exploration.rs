//! Exploration policies.
//!
//! An exploration policy maps the action values estimated by a model and the
//! greedy action to the action index actually taken in training. Every
//! policy carries a [`Schedule`], a scalar moving from its maximum to its
//! minimum by one step per completed training episode.
//!
//! | policy             | schedule    | sampling law                                    |
//! |--------------------|-------------|-------------------------------------------------|
//! | [`EpsilonGreedy`]  | epsilon     | random index with probability epsilon, else best |
//! | [`Boltzmann`]      | temperature | softmax of values divided by the temperature     |
//! | [`Dirichlet`]      | weight `w`  | `(1 - w) onehot(best) + w Dir(alpha)`            |
mod base;
mod boltzmann;
mod dirichlet;
mod epsilon_greedy;
mod explorer;
pub use base::{ExplorationPolicy, Schedule};
pub use boltzmann::{Boltzmann, BoltzmannConfig};
pub use dirichlet::{Dirichlet, DirichletConfig};
pub use epsilon_greedy::{EpsilonGreedy, EpsilonGreedyConfig};
pub use explorer::{Explorer, ExplorerConfig};
