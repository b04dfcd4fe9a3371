#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use workflow_bench_instruments::scripted::ScriptedProbe;
use workflow_bench_runner::prelude::*;

/// Shared record of everything the scripted session and probe were asked to do.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Events with the background sampler's probe reads removed, only the first probe read (the
    /// baseline) is kept.
    pub fn protocol(&self) -> Vec<String> {
        let mut seen_probe = false;
        self.events()
            .into_iter()
            .filter(|e| {
                if e == "probe" {
                    let keep = !seen_probe;
                    seen_probe = true;
                    keep
                } else {
                    true
                }
            })
            .collect()
    }
}

pub struct LoggingProbe {
    pub inner: ScriptedProbe,
    pub log: EventLog,
}

impl MemoryProbe for LoggingProbe {
    fn sample(&self) -> Result<MemorySnapshot, ProbeError> {
        self.log.push("probe");
        self.inner.sample()
    }
}

#[derive(Clone, Default)]
pub struct ScriptedFactory {
    pub log: EventLog,
    /// Datasets for which no session can be opened
    pub failing_datasets: Vec<String>,
    /// Actions or conditions that fail
    pub failing_steps: Vec<String>,
    /// Conditions that never become true
    pub timing_out: Vec<String>,
    /// Time spent in an action or condition before it succeeds
    pub delays: HashMap<String, Duration>,
    /// Raised as soon as a session is opened
    pub interrupt: Option<InterruptHandle>,
}

impl SessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    fn open(&self, input: &DatasetInput) -> Result<Self::Session, RunFailure> {
        self.log.push(format!("open {}", input.name));

        if let Some(interrupt) = &self.interrupt {
            interrupt.interrupt();
        }

        if self.failing_datasets.contains(&input.name) {
            return Err(RunFailure::session("browser could not be started"));
        }

        Ok(ScriptedSession {
            factory: self.clone(),
        })
    }
}

pub struct ScriptedSession {
    factory: ScriptedFactory,
}

impl ScriptedSession {
    fn delay(&self, name: &str) {
        if let Some(delay) = self.factory.delays.get(name) {
            std::thread::sleep(*delay);
        }
    }
}

impl ActionSequencer for ScriptedSession {
    fn perform(&mut self, action: &str) -> StepResult {
        self.factory.log.push(format!("perform {action}"));
        self.delay(action);

        if self.factory.failing_steps.iter().any(|s| s == action) {
            return Err(StepError::failed("element not clickable"));
        }

        Ok(())
    }

    fn wait_until(&mut self, condition: &str, timeout: Duration) -> StepResult {
        self.factory
            .log
            .push(format!("wait {condition} {}s", timeout.as_secs()));
        self.delay(condition);

        if self.factory.timing_out.iter().any(|s| s == condition) {
            return Err(StepError::TimedOut { timeout });
        }
        if self.factory.failing_steps.iter().any(|s| s == condition) {
            return Err(StepError::failed("page crashed"));
        }

        Ok(())
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.factory.log.push("teardown");
    }
}

pub fn fast_timings() -> Timings {
    Timings {
        settle_delay: Duration::ZERO,
        between_runs: Duration::ZERO,
        sample_interval: Duration::from_millis(1),
        ..Timings::default()
    }
}

pub fn workflow() -> Workflow {
    Workflow {
        prepare: vec![
            Step::perform("access_workflow_page"),
            Step::wait_until("page_loaded"),
            Step::perform("click_import_button"),
            Step::perform("upload_file"),
        ],
        trigger: "click_final_import_button".to_string(),
        completion: "output_changed".to_string(),
        cleanup: vec![
            Step::perform("clear_local_storage"),
            Step::perform("refresh_page"),
        ],
    }
}

pub fn sample_cli_cfg(data_dir: &Path, output_dir: &Path) -> WorkflowBenchCli {
    WorkflowBenchCli {
        mode: None,
        trials: None,
        data_dir: data_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        url: Some("http://localhost:8082/workflow".to_string()),
        headless: true,
        browser_binary: None,
        process_name: None,
        sample_interval_ms: None,
        run_id: Some("test-run".to_string()),
        no_progress: true,
    }
}

pub fn dataset(dir: &Path, name: &str, contents: &str) -> DatasetInput {
    std::fs::write(dir.join(name), contents).unwrap();
    DatasetInput::resolve(dir, name).unwrap()
}
