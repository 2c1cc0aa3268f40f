//! TensorBoard output of experiment telemetry.
use gauntlet_core::record::{Record, RecordValue, Recorder};
use log::trace;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes the scalar values of records to TensorBoard event files.
///
/// Each record is written at the step held by its step key, `train_steps`
/// by default. Records without the key are written at the latest step seen.
/// Values are tagged `<scope>/<key>` when the record carries a scope.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    step: usize,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// Event files will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "train_steps".to_string(),
            step: 0,
        }
    }

    /// Sets the key of the step value in records.
    pub fn step_key(mut self, step_key: impl Into<String>) -> Self {
        self.step_key = step_key.into();
        self
    }

    fn tag(record: &Record, key: &str) -> String {
        match record.get("scope") {
            Some(RecordValue::String(scope)) => format!("{}/{}", scope, key),
            _ => key.to_string(),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Writes the [`RecordValue::Scalar`] values of a [`Record`].
    ///
    /// Other variants are ignored.
    fn write(&mut self, record: Record) {
        if let Some(RecordValue::Scalar(v)) = record.get(&self.step_key) {
            self.step = *v as usize;
        }

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => {
                    let tag = Self::tag(&record, k);
                    self.writer.add_scalar(&tag, *v, self.step);
                }
                _ => trace!("Skipped non-scalar value {}", k),
            }
        }
    }

    fn flush(&mut self) {
        self.writer.flush();
    }
}
