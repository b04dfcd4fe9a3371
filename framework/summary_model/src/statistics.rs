use crate::RunResult;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive statistics over one series of values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub mean: f64,
    /// Sample standard deviation, using `n - 1` as the divisor. Zero for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStatistics {
    /// Compute the statistics of a series. An empty series produces all zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            0.0
        } else {
            let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (sum_sq / (n - 1.0)).sqrt()
        };
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });

        Self {
            mean,
            std,
            min,
            max,
        }
    }
}

/// Statistics for all the runs of one dataset.
///
/// Always recomputed in full from the run results. Failed runs count towards
/// [DatasetStatistics::success_rate] but their placeholder measurements are excluded from every
/// other field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub runtime: SeriesStatistics,
    pub memory_growth: SeriesStatistics,
    /// Fraction of runs that succeeded, in `[0, 1]`
    pub success_rate: f64,
    pub successful_runs: usize,
    pub total_runs: usize,
}

impl DatasetStatistics {
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = &'a RunResult>) -> Self {
        let (successful, failed): (Vec<&RunResult>, Vec<&RunResult>) =
            runs.into_iter().partition(|r| r.succeeded);
        let total_runs = successful.len() + failed.len();

        if successful.is_empty() {
            return Self {
                total_runs,
                ..Default::default()
            };
        }

        let runtimes = successful
            .iter()
            .map(|r| r.runtime_seconds)
            .collect::<Vec<_>>();
        let memory_growth = successful
            .iter()
            .map(|r| r.workflow_memory_growth_mb)
            .collect::<Vec<_>>();

        Self {
            runtime: SeriesStatistics::of(&runtimes),
            memory_growth: SeriesStatistics::of(&memory_growth),
            success_rate: successful.len() as f64 / total_runs as f64,
            successful_runs: successful.len(),
            total_runs,
        }
    }

    pub fn mean_runtime(&self) -> f64 {
        self.runtime.mean
    }

    pub fn std_runtime(&self) -> f64 {
        self.runtime.std
    }

    pub fn mean_memory_growth(&self) -> f64 {
        self.memory_growth.mean
    }

    pub fn std_memory_growth(&self) -> f64 {
        self.memory_growth.std
    }
}

/// Group run results by dataset and compute the statistics of each group.
///
/// Every dataset that has at least one run result appears in the output, including datasets
/// where every run failed. Datasets are ordered by name, not by the order they ran in.
pub fn aggregate(results: &[RunResult]) -> BTreeMap<String, DatasetStatistics> {
    results
        .iter()
        .into_group_map_by(|r| r.dataset_name.clone())
        .into_iter()
        .map(|(name, runs)| (name, DatasetStatistics::from_runs(runs)))
        .collect()
}
