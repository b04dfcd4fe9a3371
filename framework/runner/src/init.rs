use crate::cli::WorkflowBenchCli;
use clap::Parser;

/// Initialise the CLI and logging for the workflow bench runner.
pub fn init() -> WorkflowBenchCli {
    env_logger::init();

    WorkflowBenchCli::parse()
}
