use crate::probe::{MemoryProbe, MemorySnapshot, ProbeError};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Peak growth observed by the sampling thread during one measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GrowthTrack {
    /// The largest growth over the baseline, in MB. `None` until the first sample completes.
    ///
    /// This is signed, if memory only ever shrank below the baseline then it is negative.
    pub max_growth: Option<f64>,
    pub samples_taken: usize,
    /// Set if a probe error ended sampling before the window was closed. The maximum then
    /// reflects the last good sample.
    pub terminated_early: bool,
}

impl GrowthTrack {
    fn record(&mut self, growth: f64) {
        self.max_growth = Some(match self.max_growth {
            Some(max) => max.max(growth),
            None => growth,
        });
        self.samples_taken += 1;
    }
}

/// The memory attributed to a closed measurement window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalGrowth {
    pub baseline: MemorySnapshot,
    /// The synchronous sample taken after sampling stopped, if it could be read
    pub final_sample: Option<MemorySnapshot>,
    pub track: GrowthTrack,
    /// The larger of the sampled maximum and the final sample's growth, in MB
    pub growth_mb: f64,
}

#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq)]
pub enum SamplerError {
    #[display("the sampler is already running")]
    AlreadySampling,
    #[display("the sampler is not running")]
    NotSampling,
    #[display("no measurement window has been closed yet")]
    NoWindow,
    #[display("no memory sample could be taken: {source}")]
    NoSamples { source: ProbeError },
    #[display("failed to start the sampling thread: {msg}")]
    Spawn { msg: String },
    #[display("the sampling thread panicked")]
    Panicked,
}

enum SamplerState {
    Idle {
        last_window: Option<(MemorySnapshot, GrowthTrack)>,
    },
    Sampling {
        baseline: MemorySnapshot,
        stop: Sender<()>,
        handle: JoinHandle<GrowthTrack>,
    },
}

/// Samples memory in the background and tracks the peak growth over a baseline.
///
/// The sampling thread owns its [GrowthTrack] and hands it back when it is joined by
/// [MemorySampler::stop]. Once `stop` returns there is no other writer, so the returned track is
/// final.
///
/// Construct a new sampler for each run rather than sharing one between runs.
pub struct MemorySampler {
    probe: Arc<dyn MemoryProbe>,
    interval: Duration,
    state: SamplerState,
}

impl MemorySampler {
    pub fn new(probe: Arc<dyn MemoryProbe>, interval: Duration) -> Self {
        Self {
            probe,
            interval,
            state: SamplerState::Idle { last_window: None },
        }
    }

    pub fn is_sampling(&self) -> bool {
        matches!(self.state, SamplerState::Sampling { .. })
    }

    /// Start sampling relative to `baseline`. Growth tracking starts from "nothing observed".
    pub fn start(&mut self, baseline: MemorySnapshot) -> Result<(), SamplerError> {
        if self.is_sampling() {
            return Err(SamplerError::AlreadySampling);
        }

        let (stop, stop_listener) = std::sync::mpsc::channel();
        let probe = self.probe.clone();
        let interval = self.interval;
        let handle = std::thread::Builder::new()
            .name("memory-sampler".to_string())
            .spawn(move || sample_until_stopped(probe.as_ref(), baseline, interval, stop_listener))
            .map_err(|e| SamplerError::Spawn { msg: e.to_string() })?;

        log::debug!(
            "Started memory sampling every {:?} from baseline {:.2} MB",
            interval,
            baseline.megabytes()
        );

        self.state = SamplerState::Sampling {
            baseline,
            stop,
            handle,
        };

        Ok(())
    }

    /// Stop sampling and wait for the sampling thread to exit.
    pub fn stop(&mut self) -> Result<GrowthTrack, SamplerError> {
        match std::mem::replace(&mut self.state, SamplerState::Idle { last_window: None }) {
            SamplerState::Sampling {
                baseline,
                stop,
                handle,
            } => {
                // Closing the channel wakes the thread and ends its loop
                drop(stop);
                let track = handle.join().map_err(|_| SamplerError::Panicked)?;
                log::debug!(
                    "Stopped memory sampling after {} samples, max growth {:?} MB",
                    track.samples_taken,
                    track.max_growth
                );
                self.state = SamplerState::Idle {
                    last_window: Some((baseline, track)),
                };
                Ok(track)
            }
            idle => {
                self.state = idle;
                Err(SamplerError::NotSampling)
            }
        }
    }

    /// Take one more sample after [MemorySampler::stop] and report the larger of the sampled
    /// maximum and the final sample's growth.
    ///
    /// This covers a peak that the background thread sampled but has since been released, as
    /// well as a peak that fell between background samples.
    pub fn final_growth(&self) -> Result<FinalGrowth, SamplerError> {
        let (baseline, track) = match &self.state {
            SamplerState::Idle {
                last_window: Some(window),
            } => *window,
            SamplerState::Idle { last_window: None } => return Err(SamplerError::NoWindow),
            SamplerState::Sampling { .. } => return Err(SamplerError::AlreadySampling),
        };

        let final_sample = self.probe.sample();
        let growth_mb = match (&final_sample, track.max_growth) {
            (Ok(sample), Some(max)) => max.max(sample.growth_over(baseline)),
            (Ok(sample), None) => sample.growth_over(baseline),
            (Err(e), Some(max)) => {
                log::warn!("Final memory sample failed, using the sampled maximum: {e}");
                max
            }
            (Err(e), None) => return Err(SamplerError::NoSamples { source: e.clone() }),
        };

        Ok(FinalGrowth {
            baseline,
            final_sample: final_sample.ok(),
            track,
            growth_mb,
        })
    }
}

impl Drop for MemorySampler {
    fn drop(&mut self) {
        if self.is_sampling() {
            if let Err(e) = self.stop() {
                log::warn!("Memory sampler did not stop cleanly: {e}");
            }
        }
    }
}

fn sample_until_stopped(
    probe: &dyn MemoryProbe,
    baseline: MemorySnapshot,
    interval: Duration,
    stop_listener: Receiver<()>,
) -> GrowthTrack {
    let mut track = GrowthTrack::default();

    loop {
        match probe.sample() {
            Ok(sample) => track.record(sample.growth_over(baseline)),
            Err(e) => {
                log::debug!(
                    "Memory sampling ended after {} samples: {e}",
                    track.samples_taken
                );
                track.terminated_early = true;
                break;
            }
        }

        match stop_listener.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    track
}
