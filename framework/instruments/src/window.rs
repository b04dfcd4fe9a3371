use crate::probe::MemorySnapshot;
use crate::sampler::{FinalGrowth, MemorySampler, SamplerError};
use std::time::{Duration, Instant};

/// What was measured between opening and closing a [MeasurementWindow].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMeasurement {
    pub runtime: Duration,
    pub memory: FinalGrowth,
}

/// Delimits the measured part of a run.
///
/// Opening starts the sampler and then records the start time. Closing records the end time,
/// then stops the sampler and takes the final memory reading. Nothing that happens before
/// [MeasurementWindow::open] or after [MeasurementWindow::close] is timed or sampled.
///
/// Dropping an open window, for example when a step fails, stops the sampler without measuring.
pub struct MeasurementWindow {
    sampler: MemorySampler,
    started: Instant,
}

impl MeasurementWindow {
    pub fn open(
        mut sampler: MemorySampler,
        baseline: MemorySnapshot,
    ) -> Result<Self, SamplerError> {
        sampler.start(baseline)?;

        Ok(Self {
            sampler,
            started: Instant::now(),
        })
    }

    pub fn close(mut self) -> Result<WindowMeasurement, SamplerError> {
        let runtime = self.started.elapsed();
        self.sampler.stop()?;
        let memory = self.sampler.final_growth()?;

        Ok(WindowMeasurement { runtime, memory })
    }
}
