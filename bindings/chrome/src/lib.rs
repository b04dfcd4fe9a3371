mod launch;
mod script;
mod session;

pub mod prelude {
    pub use crate::launch::launch_options;
    pub use crate::script::{output_ready, BrowserAction, BrowserCondition, BrowserScript};
    pub use crate::session::{ChromeSession, ChromeSessionFactory};

    /// Re-export of the `workflow_bench_runner` prelude.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner in your scenarios.
    pub use workflow_bench_runner::prelude::*;
}
