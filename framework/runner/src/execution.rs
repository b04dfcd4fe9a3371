use crate::dataset::DatasetInput;
use crate::sequencer::{ActionSequencer, SessionFactory, Workflow};
use std::sync::Arc;
use std::time::Duration;
use workflow_bench_core::prelude::RunFailure;
use workflow_bench_instruments::{
    MeasurementWindow, MemoryProbe, MemorySampler, SamplerError, DEFAULT_SAMPLE_INTERVAL,
};
use workflow_bench_summary_model::{RunMeasurement, RunResult};

/// Timeouts and delays used while driving a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    /// Timeout for ordinary wait-for-condition steps
    pub step_timeout: Duration,
    /// Timeout for the completion condition. Must be longer than [Timings::step_timeout].
    pub completion_timeout: Duration,
    /// Pause after each preparatory step and after cleanup, to let the page settle
    pub settle_delay: Duration,
    /// Pause between consecutive runs
    pub between_runs: Duration,
    pub sample_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(10),
            completion_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(1),
            between_runs: Duration::from_secs(2),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

/// Runs the timing protocol for one (dataset, trial) pair.
///
/// Protocol order:
/// 1. open a fresh session
/// 2. read the baseline memory, before any interaction
/// 3. run the preparatory steps
/// 4. start the sampler, then record the start time
/// 5. perform the trigger action
/// 6. wait for the completion condition
/// 7. record the end time, then stop the sampler and take the final memory reading
/// 8. run the cleanup steps
/// 9. tear down the session, on every exit path
pub struct TimedExecution<'a, F: SessionFactory> {
    /// Recorded on every result so that runs of different invocations can be told apart
    run_id: &'a str,
    factory: &'a F,
    workflow: &'a Workflow,
    timings: Timings,
    probe: Arc<dyn MemoryProbe>,
}

impl<'a, F: SessionFactory> TimedExecution<'a, F> {
    pub fn new(
        run_id: &'a str,
        factory: &'a F,
        workflow: &'a Workflow,
        timings: Timings,
        probe: Arc<dyn MemoryProbe>,
    ) -> Self {
        Self {
            run_id,
            factory,
            workflow,
            timings,
            probe,
        }
    }

    /// Run the protocol and record the outcome. A failed run still produces a result.
    pub fn run(&self, input: &DatasetInput, trial_index: usize) -> RunResult {
        match self.measure(input) {
            Ok(measurement) => {
                log::info!(
                    "{} run {} completed in {:.3}s with {:.2} MB workflow memory growth",
                    input.name,
                    trial_index,
                    measurement.runtime_seconds,
                    measurement.workflow_memory_growth_mb
                );
                RunResult::success(
                    self.run_id,
                    &input.name,
                    input.file_size_bytes,
                    trial_index,
                    measurement,
                )
            }
            Err(failure) => {
                log::error!("{} run {} failed: {}", input.name, trial_index, failure);
                RunResult::failure(
                    self.run_id,
                    &input.name,
                    input.file_size_bytes,
                    trial_index,
                    failure.to_string(),
                )
            }
        }
    }

    /// Run the protocol, returning the measurement or the reason the run was aborted.
    pub fn measure(&self, input: &DatasetInput) -> Result<RunMeasurement, RunFailure> {
        let mut session = self.factory.open(input)?;

        let baseline = self.probe.sample().map_err(|e| RunFailure::Sampler {
            msg: format!("baseline memory could not be read: {e}"),
        })?;
        log::info!("Baseline memory: {:.2} MB", baseline.megabytes());

        for step in &self.workflow.prepare {
            step.execute(&mut session, self.timings.step_timeout)?;
            self.settle();
        }

        let window = MeasurementWindow::open(
            MemorySampler::new(self.probe.clone(), self.timings.sample_interval),
            baseline,
        )
        .map_err(sampler_failure)?;

        session
            .perform(&self.workflow.trigger)
            .map_err(|e| RunFailure::step(&self.workflow.trigger, e))?;
        self.wait_for_completion(&mut session)?;

        let measurement = window.close().map_err(sampler_failure)?;

        for step in &self.workflow.cleanup {
            step.execute(&mut session, self.timings.step_timeout)?;
        }
        self.settle();

        let memory = measurement.memory;
        Ok(RunMeasurement {
            runtime_seconds: measurement.runtime.as_secs_f64(),
            baseline_memory_mb: baseline.megabytes(),
            workflow_memory_growth_mb: memory.growth_mb,
            final_memory_mb: memory
                .final_sample
                .map(|sample| sample.megabytes())
                .unwrap_or_default(),
            max_sampled_growth_mb: memory.track.max_growth,
            samples_taken: memory.track.samples_taken,
        })
    }

    fn wait_for_completion(&self, session: &mut F::Session) -> Result<(), RunFailure> {
        session
            .wait_until(&self.workflow.completion, self.timings.completion_timeout)
            .map_err(|e| RunFailure::step(&self.workflow.completion, e))
    }

    fn settle(&self) {
        if !self.timings.settle_delay.is_zero() {
            std::thread::sleep(self.timings.settle_delay);
        }
    }
}

fn sampler_failure(e: SamplerError) -> RunFailure {
    RunFailure::Sampler { msg: e.to_string() }
}
