use crate::cli::WorkflowBenchCli;
use crate::execution::Timings;
use crate::sequencer::{SessionFactory, Step, Workflow};
use crate::types::WorkflowBenchResult;
use anyhow::{bail, Context};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use workflow_bench_core::prelude::InterruptHandle;
use workflow_bench_instruments::{MemoryProbe, ProcessMatcher, SysinfoProbe};

/// Settings a [SessionFactory] needs to open browser sessions, resolved from the CLI and the
/// scenario defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub url: String,
    pub headless: bool,
    pub browser_binary: Option<PathBuf>,
}

pub type SessionFactoryHook<F> = Box<dyn FnOnce(&SessionConfig) -> WorkflowBenchResult<F>>;

/// A named, fixed list of dataset files.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMode {
    pub name: String,
    pub files: Vec<String>,
}

/// The builder for a workflow benchmark definition.
///
/// This must be used in the scenario `main` to define the workflow that you want to measure.
pub struct WorkflowDefinitionBuilder<F: SessionFactory> {
    /// The name of the scenario.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you and you cannot change it.
    #[doc(hidden)]
    cli: WorkflowBenchCli,
    /// Dataset modes in the order they were defined. The first one is used if the CLI does not
    /// select a mode.
    modes: Vec<DatasetMode>,
    default_trials: usize,
    default_url: Option<String>,
    process_name: String,
    description: Option<String>,
    prepare: Vec<Step>,
    trigger: Option<String>,
    completion: Option<String>,
    cleanup: Vec<Step>,
    timings: Timings,
    session_factory: Option<SessionFactoryHook<F>>,
    /// Replaces the process table probe, mostly useful for testing the runner.
    probe: Option<Arc<dyn MemoryProbe>>,
    interrupt_handle: Option<InterruptHandle>,
}

pub struct WorkflowDefinition<F: SessionFactory> {
    pub name: String,
    pub run_id: String,
    pub mode: String,
    pub datasets: Vec<String>,
    pub trials: usize,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub description: String,
    pub workflow: Workflow,
    pub timings: Timings,
    pub session_config: SessionConfig,
    pub session_factory: SessionFactoryHook<F>,
    pub probe: Arc<dyn MemoryProbe>,
    pub interrupt_handle: InterruptHandle,
    pub no_progress: bool,
}

impl<F: SessionFactory> WorkflowDefinitionBuilder<F> {
    /// Initialise a new definition from the scenario name and command line arguments.
    /// See the [WorkflowDefinitionBuilder::name] for more information about the name.
    pub fn new_with_init(name: &str) -> Self {
        let cli = crate::init::init();

        Self::new(name, cli)
    }

    /// Initialise a new definition from the scenario name and an already parsed CLI.
    pub fn new(name: &str, cli: WorkflowBenchCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            modes: Vec::new(),
            default_trials: 3,
            default_url: None,
            process_name: "chrome".to_string(),
            description: None,
            prepare: Vec::new(),
            trigger: None,
            completion: None,
            cleanup: Vec::new(),
            timings: Timings::default(),
            session_factory: None,
            probe: None,
            interrupt_handle: None,
        }
    }

    /// Define a named dataset mode. Panics if the mode is already defined.
    pub fn use_dataset_mode(mut self, name: &str, files: &[&str]) -> Self {
        if self.modes.iter().any(|m| m.name == name) {
            panic!("Dataset mode [{}] is already defined", name);
        }

        self.modes.push(DatasetMode {
            name: name.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    /// Set the number of trials per dataset, used if `--trials` is not given.
    pub fn with_default_trials(mut self, trials: usize) -> Self {
        self.default_trials = trials;
        self
    }

    /// Set the workflow page URL, used if `--url` is not given.
    pub fn with_default_url(mut self, url: &str) -> Self {
        self.default_url = Some(url.to_string());
        self
    }

    /// Set the process name pattern for memory measurement, used if `--process-name` is not given.
    pub fn with_process_name(mut self, process_name: &str) -> Self {
        self.process_name = process_name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Add a preparatory step. These run in order before the measurement window opens.
    pub fn use_prepare_step(mut self, step: Step) -> Self {
        self.prepare.push(step);
        self
    }

    /// Set the action that starts the measured computation.
    pub fn use_trigger(mut self, action: &str) -> Self {
        self.trigger = Some(action.to_string());
        self
    }

    /// Set the condition that marks the end of the measured computation.
    pub fn use_completion(mut self, condition: &str) -> Self {
        self.completion = Some(condition.to_string());
        self
    }

    /// Add a cleanup step. These run in order after the measurement window closes.
    pub fn use_cleanup_step(mut self, step: Step) -> Self {
        self.cleanup.push(step);
        self
    }

    /// Set the hook that creates the [SessionFactory] once the configuration is resolved.
    pub fn use_session_factory(
        mut self,
        session_factory: impl FnOnce(&SessionConfig) -> WorkflowBenchResult<F> + 'static,
    ) -> Self {
        self.session_factory = Some(Box::new(session_factory));
        self
    }

    pub fn use_memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Share the interrupt signal with the caller. Ctrl-C still raises it, and the caller can
    /// also raise it to stop the benchmark at the next boundary between runs.
    pub fn use_interrupt_handle(mut self, interrupt_handle: InterruptHandle) -> Self {
        self.interrupt_handle = Some(interrupt_handle);
        self
    }

    pub(crate) fn build(self) -> WorkflowBenchResult<WorkflowDefinition<F>> {
        let cli = self.cli;

        let mode = match &cli.mode {
            Some(requested) => self
                .modes
                .iter()
                .find(|m| &m.name == requested)
                .with_context(|| {
                    format!(
                        "Invalid mode: {}. Use one of: {}",
                        requested,
                        self.modes
                            .iter()
                            .map(|m| m.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                })?,
            None => self
                .modes
                .first()
                .context("No dataset modes defined for this scenario")?,
        }
        .clone();

        let trials = cli.trials.unwrap_or(self.default_trials);
        if trials == 0 {
            bail!("At least one trial per dataset is required");
        }

        let mut timings = self.timings;
        if let Some(interval_ms) = cli.sample_interval_ms {
            timings.sample_interval = Duration::from_millis(interval_ms);
        }
        if timings.sample_interval.is_zero() {
            bail!("The memory sample interval must be greater than zero");
        }
        if timings.completion_timeout <= timings.step_timeout {
            bail!(
                "The completion timeout ({:?}) must be longer than the step timeout ({:?})",
                timings.completion_timeout,
                timings.step_timeout
            );
        }

        let workflow = Workflow {
            prepare: self.prepare,
            trigger: self
                .trigger
                .context("No trigger action defined for this scenario")?,
            completion: self
                .completion
                .context("No completion condition defined for this scenario")?,
            cleanup: self.cleanup,
        };

        let url = cli
            .url
            .clone()
            .or(self.default_url)
            .context("No URL given, pass `--url` or set a default URL in the scenario")?;

        let session_factory = self
            .session_factory
            .context("No session factory defined for this scenario")?;

        let process_name = cli.process_name.clone().unwrap_or(self.process_name);
        let probe = self.probe.unwrap_or_else(|| {
            Arc::new(SysinfoProbe::new(ProcessMatcher::new(&process_name)))
        });

        let description = self.description.unwrap_or_else(|| {
            format!(
                "Web platform workflow performance test, {} mode, {} iterations per file",
                mode.name, trials
            )
        });

        Ok(WorkflowDefinition {
            name: self.name,
            run_id: cli.run_id.clone().unwrap_or_else(|| nanoid::nanoid!()),
            mode: mode.name,
            datasets: mode.files,
            trials,
            data_dir: cli.data_dir,
            output_dir: cli.output_dir,
            description,
            workflow,
            timings,
            session_config: SessionConfig {
                url,
                headless: cli.headless,
                browser_binary: cli.browser_binary,
            },
            session_factory,
            probe,
            interrupt_handle: self.interrupt_handle.unwrap_or_default(),
            no_progress: cli.no_progress,
        })
    }
}
