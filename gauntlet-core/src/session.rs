//! Per-experiment context.
use crate::record::{Record, RecordValue, Recorder};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

/// Context of a single `conduct` call of an
/// [`Experiment`](crate::experiment::Experiment).
///
/// A session is passed to every collaborator call made while an experiment
/// runs. It owns the random number generator of the run and lends the
/// experiment's [`Recorder`] to the collaborators. The recorder is flushed
/// when the session is dropped, whatever the exit path of the run.
pub struct Session<'a> {
    scope: String,
    rng: StdRng,
    recorder: &'a mut dyn Recorder,
    n_records: usize,
}

impl<'a> Session<'a> {
    /// Opens a session.
    pub fn new(scope: impl Into<String>, seed: u64, recorder: &'a mut dyn Recorder) -> Self {
        let scope = scope.into();
        info!("Opened session {} (seed = {})", scope, seed);
        Self {
            scope,
            rng: StdRng::seed_from_u64(seed),
            recorder,
            n_records: 0,
        }
    }

    /// Scope name of the session, i.e., the full name of the experiment.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Random number generator of the run.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Writes a record to the recorder, tagged with the session scope.
    pub fn write(&mut self, mut record: Record) {
        record.insert("scope", RecordValue::String(self.scope.clone()));
        self.recorder.write(record);
        self.n_records += 1;
    }

    /// Number of records written in this session.
    pub fn n_records(&self) -> usize {
        self.n_records
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.recorder.flush();
        info!(
            "Closed session {} ({} records written)",
            self.scope, self.n_records
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BufferedRecorder;
    use rand::Rng;

    #[test]
    fn test_session_flushes_on_drop() {
        let mut recorder = BufferedRecorder::new();
        {
            let mut session = Session::new("frozen_lake_0", 3, &mut recorder);
            session.write(Record::from_scalar("loss", 1.0));
            assert_eq!(session.n_records(), 1);
        }
        assert_eq!(recorder.n_flushes(), 1);
        let record = recorder.iter().next().unwrap();
        assert_eq!(record.get_string("scope").unwrap(), "frozen_lake_0");
    }

    #[test]
    fn test_session_rng_is_seeded() {
        let mut r1 = BufferedRecorder::new();
        let mut r2 = BufferedRecorder::new();
        let a: Vec<u32> = {
            let mut s = Session::new("a", 7, &mut r1);
            (0..4).map(|_| s.rng().gen()).collect()
        };
        let b: Vec<u32> = {
            let mut s = Session::new("b", 7, &mut r2);
            (0..4).map(|_| s.rng().gen()).collect()
        };
        assert_eq!(a, b);
    }
}
