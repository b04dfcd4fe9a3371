mod report;
mod statistics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;

pub use report::{
    load_report, round_to, BenchmarkReport, DatasetSummary, ReportError, ReportMetadata,
    CSV_HEADER,
};
pub use statistics::{aggregate, DatasetStatistics, SeriesStatistics};

/// Measured values from a run that completed its whole protocol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunMeasurement {
    /// Wall-clock time between triggering the computation and observing it complete.
    pub runtime_seconds: f64,
    /// Resident memory of the matched processes before any workload interaction, in MB.
    pub baseline_memory_mb: f64,
    /// Peak growth over the baseline during the measurement window, in MB.
    pub workflow_memory_growth_mb: f64,
    /// The synchronous sample taken after the sampler stopped, in MB.
    pub final_memory_mb: f64,
    /// The largest growth seen by the background sampler, if it completed any sample.
    pub max_sampled_growth_mb: Option<f64>,
    /// Number of background samples completed during the measurement window.
    pub samples_taken: usize,
}

/// Result of a single run, one per (dataset, trial) pair.
///
/// Failed runs are recorded too, with zeroed measurement fields, so that the success rate of a
/// dataset counts every attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    /// The benchmark invocation this run belongs to
    pub run_id: String,
    /// The name of the input file that drove this run
    pub dataset_name: String,
    /// Size of the input file on disk
    pub file_size_bytes: u64,
    /// The trial number within the dataset, starting at 1
    pub trial_index: usize,
    pub runtime_seconds: f64,
    pub baseline_memory_mb: f64,
    pub workflow_memory_growth_mb: f64,
    pub final_memory_mb: f64,
    /// Not set if the run failed or the sampler never completed a sample.
    pub max_sampled_growth_mb: Option<f64>,
    pub samples_taken: usize,
    pub succeeded: bool,
    /// The failure reason, only set when [RunResult::succeeded] is false
    pub error_detail: Option<String>,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl RunResult {
    /// Create the result of a run that completed its protocol.
    pub fn success(
        run_id: impl Into<String>,
        dataset_name: impl Into<String>,
        file_size_bytes: u64,
        trial_index: usize,
        measurement: RunMeasurement,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            dataset_name: dataset_name.into(),
            file_size_bytes,
            trial_index,
            runtime_seconds: measurement.runtime_seconds,
            baseline_memory_mb: measurement.baseline_memory_mb,
            workflow_memory_growth_mb: measurement.workflow_memory_growth_mb,
            final_memory_mb: measurement.final_memory_mb,
            max_sampled_growth_mb: measurement.max_sampled_growth_mb,
            samples_taken: measurement.samples_taken,
            succeeded: true,
            error_detail: None,
            timestamp: Utc::now(),
        }
    }

    /// Create the result of a run that was aborted.
    pub fn failure(
        run_id: impl Into<String>,
        dataset_name: impl Into<String>,
        file_size_bytes: u64,
        trial_index: usize,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            dataset_name: dataset_name.into(),
            file_size_bytes,
            trial_index,
            runtime_seconds: 0.0,
            baseline_memory_mb: 0.0,
            workflow_memory_growth_mb: 0.0,
            final_memory_mb: 0.0,
            max_sampled_growth_mb: None,
            samples_taken: 0,
            succeeded: false,
            error_detail: Some(error_detail.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Append a run result to a file
///
/// The result will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_result(run_result: &RunResult, path: &Path) -> Result<(), ReportError> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_result(run_result, &mut file)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Serialize the run result to a writer
pub fn store_run_result<W: Write>(run_result: &RunResult, writer: &mut W) -> Result<(), ReportError> {
    serde_json::to_writer(writer, run_result)?;
    Ok(())
}

/// Load run results from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_run_result]. Blank lines are ignored.
pub fn load_run_results(path: &Path) -> Result<Vec<RunResult>, ReportError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut runs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let run: RunResult = serde_json::from_str(&line)?;
        runs.push(run);
    }
    Ok(runs)
}

/// Load the run results of one benchmark invocation from a file that may hold several.
pub fn load_run_results_for(path: &Path, run_id: &str) -> Result<Vec<RunResult>, ReportError> {
    let mut runs = load_run_results(path)?;
    runs.retain(|run| run.run_id == run_id);
    Ok(runs)
}
