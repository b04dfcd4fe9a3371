use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use workflow_bench_core::prelude::InterruptListener;
use workflow_bench_instruments::print_summary;
use workflow_bench_summary_model::{
    aggregate, append_run_result, BenchmarkReport, DatasetStatistics, ReportMetadata, RunResult,
};

use crate::dataset::DatasetInput;
use crate::definition::WorkflowDefinitionBuilder;
use crate::execution::TimedExecution;
use crate::interrupt::start_interrupt_listener;
use crate::progress::start_progress;
use crate::sequencer::SessionFactory;
use crate::types::WorkflowBenchResult;

/// Everything produced by a benchmark invocation.
#[derive(Debug)]
pub struct BenchmarkOutcome {
    /// Every run, in the order it was executed
    pub results: Vec<RunResult>,
    pub statistics: BTreeMap<String, DatasetStatistics>,
    pub report: BenchmarkReport,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
    /// The raw per-run log, one JSON object per line
    pub run_log_path: PathBuf,
    /// True if the benchmark was interrupted before all runs were done
    pub interrupted: bool,
}

pub fn run<F: SessionFactory>(
    definition: WorkflowDefinitionBuilder<F>,
) -> WorkflowBenchResult<BenchmarkOutcome> {
    let definition = definition.build()?;

    log::info!(
        "Running workflow benchmark {} in {} mode, run id {}",
        definition.name,
        definition.mode,
        definition.run_id
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let interrupt_handle = definition.interrupt_handle.clone();
    start_interrupt_listener(&runtime, interrupt_handle.clone());

    std::fs::create_dir_all(&definition.output_dir).with_context(|| {
        format!(
            "Unable to create output directory {}",
            definition.output_dir.display()
        )
    })?;
    let run_log_path = definition
        .output_dir
        .join(format!("run_results_{}.jsonl", definition.mode));
    let csv_path = definition
        .output_dir
        .join(format!("platform_performance_{}.csv", definition.mode));
    let json_path = definition
        .output_dir
        .join(format!("platform_performance_{}.json", definition.mode));

    let factory = (definition.session_factory)(&definition.session_config)
        .context("Failed to create the session factory")?;
    let execution = TimedExecution::new(
        &definition.run_id,
        &factory,
        &definition.workflow,
        definition.timings,
        definition.probe.clone(),
    );

    let inputs = definition
        .datasets
        .iter()
        .filter_map(|file_name| DatasetInput::resolve(&definition.data_dir, file_name))
        .collect::<Vec<_>>();
    if inputs.is_empty() {
        log::warn!(
            "None of the {} dataset files were found in {}",
            definition.datasets.len(),
            definition.data_dir.display()
        );
    }

    let total_runs = inputs.len() * definition.trials;
    let progress = (!definition.no_progress).then(|| start_progress(total_runs));
    let mut interrupt_listener = interrupt_handle.new_listener();
    let mut results = Vec::with_capacity(total_runs);

    'datasets: for input in &inputs {
        log::info!(
            "Testing {} (size: {} bytes)",
            input.name,
            input.file_size_bytes
        );
        if let Some(pb) = &progress {
            pb.set_message(input.name.clone());
        }

        for trial_index in 1..=definition.trials {
            if interrupt_listener.is_interrupted() {
                break 'datasets;
            }

            log::info!("Run {}/{} of {}", trial_index, definition.trials, input.name);
            let result = execution.run(input, trial_index);
            if let Err(e) = append_run_result(&result, &run_log_path) {
                log::warn!(
                    "Failed to append run result to {}: {e}",
                    run_log_path.display()
                );
            }
            results.push(result);

            if let Some(pb) = &progress {
                pb.inc(1);
            }

            if results.len() < total_runs {
                wait_between_runs(
                    &runtime,
                    &mut interrupt_listener,
                    definition.timings.between_runs,
                );
            }
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let interrupted = results.len() < total_runs;
    if interrupted {
        log::warn!(
            "Benchmark interrupted after {} of {} runs, reporting partial results",
            results.len(),
            total_runs
        );
    }

    let statistics = aggregate(&results);
    let report = BenchmarkReport::new(
        ReportMetadata {
            timestamp: Utc::now(),
            platform: format!("web_browser_{}", definition.mode),
            description: definition.description.clone(),
            workflow_steps: definition.workflow.step_names(),
            measurement_method: "process_memory_growth".to_string(),
            memory_note: "Measures workflow memory growth only, relative to a baseline taken before any interaction".to_string(),
            run_id: definition.run_id.clone(),
            mode: definition.mode.clone(),
            trials_per_dataset: definition.trials,
        },
        &statistics,
    );

    report
        .write_csv(&csv_path)
        .with_context(|| format!("Failed to write CSV report to {}", csv_path.display()))?;
    report
        .write_json(&json_path)
        .with_context(|| format!("Failed to write JSON report to {}", json_path.display()))?;
    log::info!(
        "Results saved to {} and {}",
        csv_path.display(),
        json_path.display()
    );

    print_summary(&statistics);

    Ok(BenchmarkOutcome {
        results,
        statistics,
        report,
        csv_path,
        json_path,
        run_log_path,
        interrupted,
    })
}

/// Pause between runs so the browser processes from the previous run have exited. Cut short if
/// the benchmark is interrupted.
fn wait_between_runs(
    runtime: &tokio::runtime::Runtime,
    interrupt_listener: &mut InterruptListener,
    delay: Duration,
) {
    if delay.is_zero() {
        return;
    }

    runtime.block_on(async {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {},
            _ = interrupt_listener.wait_for_interrupt() => {
                log::debug!("Delay between runs cut short by interrupt");
            },
        }
    });
}
