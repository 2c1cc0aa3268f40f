//! Types and traits for recording telemetry of experiments.
//!
//! * [`Record`] - A container of key-value pairs of various data types
//! * [`RecordValue`] - Values that can be stored in a [`Record`]
//! * [`Recorder`] - Output destination of [`Record`]s
//! * [`BufferedRecorder`] - Keeps records in memory
//! * [`NullRecorder`] - Discards all records
//!
//! ```rust
//! use gauntlet_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("train_steps", RecordValue::Scalar(120.0));
//! record.insert("loss", RecordValue::Scalar(0.25));
//! assert_eq!(record.get_scalar("loss").unwrap(), 0.25);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
