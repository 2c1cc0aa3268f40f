use super::{Record, RecordValue, Recorder};

/// Buffered recorder.
///
/// Keeps every written [`Record`] in memory, in order of arrival.
/// It is mainly used to inspect the telemetry of a run in tests.
#[derive(Debug, Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    n_flushes: usize,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of times [`Recorder::flush`] was called.
    pub fn n_flushes(&self) -> usize {
        self.n_flushes
    }

    /// Scalar values stored under `key`, skipping records without it.
    pub fn scalars(&self, key: &str) -> Vec<f32> {
        self.buf
            .iter()
            .filter_map(|r| match r.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

impl Recorder for BufferedRecorder {
    /// Write a [`Record`] to the buffer.
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }

    fn flush(&mut self) {
        self.n_flushes += 1;
    }
}
