mod common;

use common::*;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use workflow_bench_summary_model::{aggregate, load_run_results, load_run_results_for};
use workflow_bench_instruments::scripted::ScriptedProbe;
use workflow_bench_runner::prelude::*;

fn scripted_definition(
    cli: WorkflowBenchCli,
    factory: ScriptedFactory,
) -> WorkflowDefinitionBuilder<ScriptedFactory> {
    let workflow = workflow();
    let mut builder = WorkflowDefinitionBuilder::new("scripted_workflow", cli)
        .use_dataset_mode(
            "vs_local",
            &["AllMis_2400.json", "BraLanc_464.json", "Missing.json"],
        )
        .use_dataset_mode("vs_galaxy", &["BraLanc_464_Galaxy.json"])
        .with_timings(fast_timings())
        .use_trigger(&workflow.trigger)
        .use_completion(&workflow.completion)
        .use_memory_probe(Arc::new(ScriptedProbe::constant(300.0)))
        .use_session_factory(move |config| {
            assert_eq!("http://localhost:8082/workflow", config.url);
            Ok(factory)
        });

    for step in workflow.prepare {
        builder = builder.use_prepare_step(step);
    }
    for step in workflow.cleanup {
        builder = builder.use_cleanup_step(step);
    }

    builder
}

fn write_datasets(dir: &Path) {
    std::fs::write(dir.join("AllMis_2400.json"), "[1, 2, 3]").unwrap();
    std::fs::write(dir.join("BraLanc_464.json"), "[]").unwrap();
}

#[test]
fn run_reports_every_found_dataset() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    write_datasets(data_dir.path());

    let factory = ScriptedFactory {
        failing_datasets: vec!["BraLanc_464.json".to_string()],
        ..Default::default()
    };
    let log = factory.log.clone();

    let outcome = run(scripted_definition(
        sample_cli_cfg(data_dir.path(), output_dir.path()),
        factory,
    ))
    .unwrap();

    assert!(!outcome.interrupted);
    assert_eq!(6, outcome.results.len());
    assert_eq!(
        vec![
            ("AllMis_2400.json", 1),
            ("AllMis_2400.json", 2),
            ("AllMis_2400.json", 3),
            ("BraLanc_464.json", 1),
            ("BraLanc_464.json", 2),
            ("BraLanc_464.json", 3),
        ],
        outcome
            .results
            .iter()
            .map(|r| (r.dataset_name.as_str(), r.trial_index))
            .collect::<Vec<_>>()
    );

    // A fresh session per run, and the missing dataset is never opened
    let opened = log
        .events()
        .into_iter()
        .filter(|e| e.starts_with("open "))
        .count();
    assert_eq!(6, opened);

    let keys = outcome.report.results.keys().cloned().collect::<Vec<_>>();
    assert_eq!(vec!["AllMis_2400.json", "BraLanc_464.json"], keys);

    let all_mis = &outcome.report.results["AllMis_2400.json"];
    assert_eq!(1.0, all_mis.success_rate);
    assert_eq!(0.0, all_mis.mean_workflow_memory);

    let bra_lanc = &outcome.report.results["BraLanc_464.json"];
    assert_eq!(0.0, bra_lanc.success_rate);
    assert_eq!(0.0, bra_lanc.mean_runtime);
    assert_eq!(0.0, bra_lanc.std_runtime);
    assert_eq!(0.0, bra_lanc.mean_workflow_memory);
    assert_eq!(0.0, bra_lanc.std_workflow_memory);

    assert_eq!("web_browser_vs_local", outcome.report.metadata.platform);
    assert_eq!("test-run", outcome.report.metadata.run_id);
    assert_eq!(3, outcome.report.metadata.trials_per_dataset);
    assert_eq!(
        "Web platform workflow performance test, vs_local mode, 3 iterations per file",
        outcome.report.metadata.description
    );

    assert_eq!(
        output_dir.path().join("platform_performance_vs_local.csv"),
        outcome.csv_path
    );
    let csv = std::fs::read_to_string(&outcome.csv_path).unwrap();
    assert!(csv.starts_with("# Platform Performance Results\n"));
    assert!(csv.contains("BraLanc_464.json,0.000,0.000,0.00,0.00,0.000"));
    assert!(!csv.contains("Missing.json"));

    let written = workflow_bench_summary_model::load_report(&outcome.json_path).unwrap();
    assert_eq!(outcome.report, written);

    let logged = load_run_results(&outcome.run_log_path).unwrap();
    assert_eq!(outcome.results, logged);
}

#[test]
fn cli_selects_mode_and_trials() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    std::fs::write(data_dir.path().join("BraLanc_464_Galaxy.json"), "{}").unwrap();

    let mut cli = sample_cli_cfg(data_dir.path(), output_dir.path());
    cli.mode = Some("vs_galaxy".to_string());
    cli.trials = Some(2);

    let outcome = run(scripted_definition(cli, ScriptedFactory::default())).unwrap();

    assert_eq!(2, outcome.results.len());
    assert!(outcome.results.iter().all(|r| r.succeeded));
    assert_eq!("vs_galaxy", outcome.report.metadata.mode);
    assert!(output_dir
        .path()
        .join("platform_performance_vs_galaxy.json")
        .exists());
}

#[test]
fn no_datasets_found_still_writes_reports() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let outcome = run(scripted_definition(
        sample_cli_cfg(data_dir.path(), output_dir.path()),
        ScriptedFactory::default(),
    ))
    .unwrap();

    assert!(outcome.results.is_empty());
    assert!(outcome.report.results.is_empty());
    assert!(outcome.csv_path.exists());
    assert!(outcome.json_path.exists());
}

#[test]
fn invalid_mode_is_rejected() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let mut cli = sample_cli_cfg(data_dir.path(), output_dir.path());
    cli.mode = Some("vs_cloud".to_string());

    let err = run(scripted_definition(cli, ScriptedFactory::default())).unwrap_err();

    assert_eq!(
        "Invalid mode: vs_cloud. Use one of: vs_local, vs_galaxy",
        err.to_string()
    );
    assert!(std::fs::read_dir(output_dir.path()).unwrap().next().is_none());
}

#[test]
fn zero_trials_are_rejected() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let mut cli = sample_cli_cfg(data_dir.path(), output_dir.path());
    cli.trials = Some(0);

    let err = run(scripted_definition(cli, ScriptedFactory::default())).unwrap_err();

    assert_eq!("At least one trial per dataset is required", err.to_string());
}

#[test]
fn completion_timeout_must_exceed_step_timeout() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let timings = Timings {
        completion_timeout: std::time::Duration::from_secs(5),
        ..fast_timings()
    };
    let builder = scripted_definition(
        sample_cli_cfg(data_dir.path(), output_dir.path()),
        ScriptedFactory::default(),
    )
    .with_timings(timings);

    let err = run(builder).unwrap_err();

    assert!(err.to_string().contains("must be longer than the step timeout"));
}

#[test]
fn repeated_invocations_share_the_run_log() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    write_datasets(data_dir.path());

    let mut outcomes = Vec::new();
    for run_id in ["first-run", "second-run"] {
        let mut cli = sample_cli_cfg(data_dir.path(), output_dir.path());
        cli.trials = Some(2);
        cli.run_id = Some(run_id.to_string());
        outcomes.push(run(scripted_definition(cli, ScriptedFactory::default())).unwrap());
    }

    let second = &outcomes[1];
    assert_eq!(4, second.results.len());
    assert!(second.results.iter().all(|r| r.run_id == "second-run"));
    assert_eq!(8, load_run_results(&second.run_log_path).unwrap().len());

    let logged = load_run_results_for(&second.run_log_path, "second-run").unwrap();
    assert_eq!(second.results, logged);

    let statistics = aggregate(&logged);
    assert_eq!(2, statistics["AllMis_2400.json"].total_runs);
    assert_eq!(2, statistics["BraLanc_464.json"].total_runs);
}

#[test]
fn interrupt_stops_at_the_next_run_boundary() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    write_datasets(data_dir.path());

    let interrupt = InterruptHandle::new();
    let factory = ScriptedFactory {
        interrupt: Some(interrupt.clone()),
        ..Default::default()
    };
    let timings = Timings {
        between_runs: Duration::from_secs(60),
        ..fast_timings()
    };
    let builder = scripted_definition(
        sample_cli_cfg(data_dir.path(), output_dir.path()),
        factory,
    )
    .with_timings(timings)
    .use_interrupt_handle(interrupt);

    let started = Instant::now();
    let outcome = run(builder).unwrap();

    assert!(
        started.elapsed() < Duration::from_secs(30),
        "the delay between runs was not cut short"
    );
    assert!(outcome.interrupted);

    // The run in progress when the interrupt arrived still completes
    assert_eq!(1, outcome.results.len());
    assert!(outcome.results[0].succeeded);
    assert_eq!("AllMis_2400.json", outcome.results[0].dataset_name);

    let keys = outcome.report.results.keys().cloned().collect::<Vec<_>>();
    assert_eq!(vec!["AllMis_2400.json"], keys);
    assert!(outcome.csv_path.exists());
    assert_eq!(1, load_run_results(&outcome.run_log_path).unwrap().len());
}

#[test]
fn interrupt_during_the_last_run_is_not_reported() {
    let data_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    std::fs::write(data_dir.path().join("BraLanc_464_Galaxy.json"), "{}").unwrap();

    let interrupt = InterruptHandle::new();
    let factory = ScriptedFactory {
        interrupt: Some(interrupt.clone()),
        ..Default::default()
    };
    let mut cli = sample_cli_cfg(data_dir.path(), output_dir.path());
    cli.mode = Some("vs_galaxy".to_string());
    cli.trials = Some(1);

    let outcome = run(scripted_definition(cli, factory).use_interrupt_handle(interrupt)).unwrap();

    assert_eq!(1, outcome.results.len());
    assert!(!outcome.interrupted);
}
