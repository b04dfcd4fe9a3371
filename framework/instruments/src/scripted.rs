use crate::{MemoryProbe, MemorySnapshot, ProbeError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A probe that replays a programmed sequence of readings.
///
/// Once the sequence is exhausted the last reading is repeated, so a single value behaves as a
/// constant probe.
pub struct ScriptedProbe {
    readings: Mutex<VecDeque<Result<f64, ProbeError>>>,
    last: Mutex<Result<f64, ProbeError>>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(readings: impl IntoIterator<Item = Result<f64, ProbeError>>) -> Self {
        Self {
            readings: Mutex::new(readings.into_iter().collect()),
            last: Mutex::new(Ok(0.0)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn sequence(megabytes: impl IntoIterator<Item = f64>) -> Self {
        Self::new(megabytes.into_iter().map(Ok))
    }

    pub fn constant(megabytes: f64) -> Self {
        Self::sequence([megabytes])
    }

    /// How many times the probe has been sampled
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MemoryProbe for ScriptedProbe {
    fn sample(&self) -> Result<MemorySnapshot, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut last = self.last.lock();
        if let Some(next) = self.readings.lock().pop_front() {
            *last = next;
        }

        last.clone().map(MemorySnapshot::from_megabytes)
    }
}
