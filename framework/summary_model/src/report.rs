use crate::statistics::DatasetStatistics;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Column names of the tabular report.
pub const CSV_HEADER: [&str; 6] = [
    "test_file",
    "mean_runtime_s",
    "std_runtime_s",
    "mean_workflow_memory_mb",
    "std_workflow_memory_mb",
    "success_rate",
];

const TIME_PLACES: u32 = 3;
const MEMORY_PLACES: u32 = 2;
const RATE_PLACES: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Describes the benchmark that produced a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub timestamp: DateTime<Utc>,
    /// Label for the platform under test, for example `web_browser_vs_local`
    pub platform: String,
    pub description: String,
    /// The names of the workflow steps, in the order they are executed
    pub workflow_steps: Vec<String>,
    pub measurement_method: String,
    pub memory_note: String,
    /// Unique for each invocation of the benchmark
    pub run_id: String,
    /// The dataset mode that selected the input files
    pub mode: String,
    pub trials_per_dataset: usize,
}

/// The per-dataset entry of a report, rounded for presentation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DatasetSummary {
    pub mean_runtime: f64,
    pub std_runtime: f64,
    pub min_runtime: f64,
    pub max_runtime: f64,
    pub mean_workflow_memory: f64,
    pub std_workflow_memory: f64,
    pub min_workflow_memory: f64,
    pub max_workflow_memory: f64,
    pub success_rate: f64,
}

impl From<&DatasetStatistics> for DatasetSummary {
    fn from(stats: &DatasetStatistics) -> Self {
        Self {
            mean_runtime: round_to(stats.runtime.mean, TIME_PLACES),
            std_runtime: round_to(stats.runtime.std, TIME_PLACES),
            min_runtime: round_to(stats.runtime.min, TIME_PLACES),
            max_runtime: round_to(stats.runtime.max, TIME_PLACES),
            mean_workflow_memory: round_to(stats.memory_growth.mean, MEMORY_PLACES),
            std_workflow_memory: round_to(stats.memory_growth.std, MEMORY_PLACES),
            min_workflow_memory: round_to(stats.memory_growth.min, MEMORY_PLACES),
            max_workflow_memory: round_to(stats.memory_growth.max, MEMORY_PLACES),
            success_rate: round_to(stats.success_rate, RATE_PLACES),
        }
    }
}

/// Aggregated results of a benchmark, ready to be written out.
///
/// The same set of datasets is written to both the JSON and the CSV form. A dataset where every
/// run failed is present with zeroed values, a dataset that was never run is absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkReport {
    pub metadata: ReportMetadata,
    pub results: BTreeMap<String, DatasetSummary>,
}

impl BenchmarkReport {
    pub fn new(
        metadata: ReportMetadata,
        statistics: &BTreeMap<String, DatasetStatistics>,
    ) -> Self {
        Self {
            metadata,
            results: statistics
                .iter()
                .map(|(name, stats)| (name.clone(), DatasetSummary::from(stats)))
                .collect(),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let file = std::fs::File::create(path)?;
        self.write_json_to(file)
    }

    pub fn write_json_to<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ReportError> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)
    }

    /// Write the tabular form: a commented header block followed by one row per dataset.
    pub fn write_csv_to<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        writeln!(writer, "# Platform Performance Results")?;
        writeln!(writer, "# Platform: {}", self.metadata.platform)?;
        writeln!(
            writer,
            "# Timestamp: {}",
            self.metadata
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Micros, true)
        )?;
        writeln!(writer, "# Description: {}", self.metadata.description)?;
        writeln!(writer)?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_HEADER)?;
        for (name, summary) in &self.results {
            csv_writer.write_record([
                name.clone(),
                format!("{:.3}", summary.mean_runtime),
                format!("{:.3}", summary.std_runtime),
                format!("{:.2}", summary.mean_workflow_memory),
                format!("{:.2}", summary.std_workflow_memory),
                format!("{:.3}", summary.success_rate),
            ])?;
        }
        csv_writer.flush()?;

        Ok(())
    }
}

/// Load a report previously written with [BenchmarkReport::write_json].
pub fn load_report(path: &Path) -> Result<BenchmarkReport, ReportError> {
    let file = std::fs::File::open(path)?;
    let report = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(report)
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
