use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct WorkflowBenchCli {
    /// The dataset mode to run. Each mode selects a fixed list of input files.
    ///
    /// Defaults to the first mode defined by the scenario.
    #[clap(short, long)]
    pub mode: Option<String>,

    /// The number of trials to run for each dataset
    #[clap(long)]
    pub trials: Option<usize>,

    /// The directory containing the dataset files
    #[clap(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// The directory to write reports to. It will be created if it does not exist.
    #[clap(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// The URL of the page hosting the workflow
    #[clap(long)]
    pub url: Option<String>,

    /// Run the browser without a visible window
    #[clap(long, default_value = "false")]
    pub headless: bool,

    /// Path to the browser binary. Discovered from the system if not set.
    #[clap(long)]
    pub browser_binary: Option<PathBuf>,

    /// Case-insensitive substring of the names of the processes whose memory is measured
    #[clap(long)]
    pub process_name: Option<String>,

    /// The interval between memory samples, in milliseconds
    #[clap(long)]
    pub sample_interval_ms: Option<u64>,

    /// An id for this benchmark invocation, recorded in the report. Generated if not set.
    #[clap(long)]
    pub run_id: Option<String>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}
