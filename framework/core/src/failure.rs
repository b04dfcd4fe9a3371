use std::time::Duration;

/// The reason a single scripted step did not complete.
///
/// Returned by action sequencers from `perform` and `wait_until`. The runner wraps it in a
/// [RunFailure::Step] along with the name of the step that was being executed.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq)]
pub enum StepError {
    /// The action was attempted but the driver reported an error.
    #[display("{msg}")]
    Failed { msg: String },
    /// A wait-for-condition step did not observe its condition within the allowed time.
    #[display("condition not met within {timeout:?}")]
    TimedOut { timeout: Duration },
    /// The sequencer has no action registered under this name.
    #[display("no action named `{name}` is registered")]
    UnknownAction { name: String },
    /// The sequencer has no condition registered under this name.
    #[display("no condition named `{name}` is registered")]
    UnknownCondition { name: String },
}

impl StepError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed { msg: msg.into() }
    }
}

/// Why a run was aborted.
///
/// A run that fails still produces a result record, the failure is carried as a value and its
/// [Display](std::fmt::Display) output becomes the recorded error detail.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq)]
pub enum RunFailure {
    /// The browser session could not be created.
    #[display("Failed to open session: {msg}")]
    Session { msg: String },
    /// A scripted step failed or timed out.
    #[display("Step `{step}` failed: {source}")]
    Step { step: String, source: StepError },
    /// The memory sampler could not be driven through its lifecycle.
    #[display("Memory sampler error: {msg}")]
    Sampler { msg: String },
    /// The dataset for this run could not be read.
    #[display("Input error: {msg}")]
    Input { msg: String },
}

impl RunFailure {
    pub fn step(step: impl Into<String>, source: StepError) -> Self {
        Self::Step {
            step: step.into(),
            source,
        }
    }

    pub fn session(msg: impl std::fmt::Display) -> Self {
        Self::Session {
            msg: msg.to_string(),
        }
    }

    /// True if the failure was a wait-for-condition step running out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Step {
                source: StepError::TimedOut { .. },
                ..
            }
        )
    }
}
