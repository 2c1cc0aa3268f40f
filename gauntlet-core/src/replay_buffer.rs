//! Replay buffers.
//!
//! * [`SimpleReplayBuffer`] samples stored transitions uniformly.
//! * [`PrioritizedReplayBuffer`] samples transitions in proportion to their
//!   last reported error and attaches importance sampling weights to batches.
//!
//! ```rust
//! use gauntlet_core::{
//!     replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig},
//!     ReplayBuffer, Transition,
//! };
//!
//! let config = SimpleReplayBufferConfig::default().capacity(100).seed(42);
//! let mut buffer = SimpleReplayBuffer::<usize, usize>::build(&config);
//! buffer
//!     .store(Transition { obs: 0, act: 1, reward: 0.0, next_obs: 4, is_terminal: false })
//!     .unwrap();
//! let batch = buffer.get(1).unwrap();
//! assert_eq!(batch.next_obs, vec![4]);
//! ```
mod config;
mod prioritized;
mod simple;
pub use config::{PerConfig, PrioritizedReplayBufferConfig, SimpleReplayBufferConfig};
pub use prioritized::{IwScheduler, PrioritizedReplayBuffer};
pub use simple::SimpleReplayBuffer;
