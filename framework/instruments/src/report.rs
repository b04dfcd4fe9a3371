mod summary_table;

use crate::report::summary_table::DatasetRow;
use std::collections::BTreeMap;
use tabled::settings::Style;
use tabled::Table;
use workflow_bench_summary_model::DatasetStatistics;

/// Render the per-dataset statistics as a table for the console.
pub fn summary_table(statistics: &BTreeMap<String, DatasetStatistics>) -> String {
    let rows = statistics
        .iter()
        .map(|(dataset, stats)| DatasetRow {
            dataset: dataset.clone(),
            successful_runs: format!("{}/{}", stats.successful_runs, stats.total_runs),
            mean_runtime_s: stats.runtime.mean,
            min_runtime_s: stats.runtime.min,
            max_runtime_s: stats.runtime.max,
            mean_memory_mb: stats.memory_growth.mean,
            max_memory_mb: stats.memory_growth.max,
            success_rate: stats.success_rate,
        })
        .collect::<Vec<_>>();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    table.to_string()
}

/// Print the summary of all datasets at the end of a benchmark.
pub fn print_summary(statistics: &BTreeMap<String, DatasetStatistics>) {
    println!("\nSummary of datasets");
    println!("{}", summary_table(statistics));

    for (dataset, stats) in statistics {
        if stats.successful_runs == 0 {
            println!("{dataset}: all {} runs failed", stats.total_runs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_bench_summary_model::SeriesStatistics;

    #[test]
    fn table_has_a_row_per_dataset() {
        let mut statistics = BTreeMap::new();
        statistics.insert(
            "BraLanc_464.json".to_string(),
            DatasetStatistics {
                runtime: SeriesStatistics {
                    mean: 3.5,
                    std: 0.70710678,
                    min: 3.0,
                    max: 4.0,
                },
                memory_growth: SeriesStatistics {
                    mean: 21.0,
                    std: 1.41421356,
                    min: 20.0,
                    max: 22.0,
                },
                success_rate: 2.0 / 3.0,
                successful_runs: 2,
                total_runs: 3,
            },
        );
        statistics.insert(
            "HydCol_1000.json".to_string(),
            DatasetStatistics {
                total_runs: 3,
                ..Default::default()
            },
        );

        let table = summary_table(&statistics);

        assert!(table.contains("BraLanc_464.json"));
        assert!(table.contains("2/3"));
        assert!(table.contains("3.500"));
        assert!(table.contains("21.00"));
        assert!(table.contains("0/3"));
    }
}
