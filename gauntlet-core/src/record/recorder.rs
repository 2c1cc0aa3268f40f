use super::Record;

/// Writes a record to an output destination with [`Recorder::write`].
///
/// Recorders are owned by an experiment and lent to its
/// [`Session`](crate::Session) during `conduct`.
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);

    /// Flushes buffered output, if any.
    fn flush(&mut self) {}
}
