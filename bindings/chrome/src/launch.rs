use anyhow::Context;
use headless_chrome::{LaunchOptions, LaunchOptionsBuilder};
use std::ffi::OsStr;
use workflow_bench_runner::prelude::{SessionConfig, WorkflowBenchResult};

const WINDOW_SIZE: (u32, u32) = (1440, 900);

/// Build the browser launch options for a session.
pub fn launch_options(config: &SessionConfig) -> WorkflowBenchResult<LaunchOptions<'static>> {
    let mut builder = LaunchOptionsBuilder::default();
    builder
        .headless(config.headless)
        .sandbox(false)
        .window_size(Some(WINDOW_SIZE))
        .args(vec![
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--no-first-run"),
        ]);

    if let Some(path) = &config.browser_binary {
        builder.path(Some(path.clone()));
    }

    builder
        .build()
        .context("Unable to construct browser launch options")
}
