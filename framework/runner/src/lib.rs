mod cli;
mod dataset;
mod definition;
mod execution;
mod init;
mod interrupt;
mod progress;
mod run;
mod sequencer;
mod types;

pub mod prelude {
    pub use crate::cli::WorkflowBenchCli;
    pub use crate::dataset::DatasetInput;
    pub use crate::definition::{
        DatasetMode, SessionConfig, WorkflowDefinition, WorkflowDefinitionBuilder,
    };
    pub use crate::execution::{TimedExecution, Timings};
    pub use crate::run::{run, BenchmarkOutcome};
    pub use crate::sequencer::{ActionSequencer, SessionFactory, Step, StepResult, Workflow};
    pub use crate::types::WorkflowBenchResult;
    pub use workflow_bench_core::prelude::{InterruptHandle, RunFailure, StepError};
    pub use workflow_bench_instruments::{MemoryProbe, MemorySnapshot, ProbeError};
    pub use workflow_bench_summary_model::{DatasetStatistics, RunResult};
}
