use crate::dataset::DatasetInput;
use std::time::Duration;
use workflow_bench_core::prelude::{RunFailure, StepError};

pub type StepResult = Result<(), StepError>;

/// Drives an external session through named actions and conditions.
///
/// The runner treats actions and conditions as opaque names. It is up to the implementation to
/// map them to concrete interactions, such as clicking an element or reading its text.
pub trait ActionSequencer {
    /// Perform a single deterministic action, such as a click or a navigation.
    fn perform(&mut self, action: &str) -> StepResult;

    /// Block until the named condition holds, or fail with [StepError::TimedOut] once `timeout`
    /// has elapsed.
    fn wait_until(&mut self, condition: &str, timeout: Duration) -> StepResult;
}

/// Creates a fresh, isolated session for each run.
///
/// The session is torn down when it is dropped. The runner relies on this to release the session
/// on every exit path of a run, including failures.
pub trait SessionFactory {
    type Session: ActionSequencer;

    fn open(&self, input: &DatasetInput) -> Result<Self::Session, RunFailure>;
}

/// One scripted step of a workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Perform {
        action: String,
    },
    WaitUntil {
        condition: String,
        /// Uses the runner's step timeout if not set
        timeout: Option<Duration>,
    },
}

impl Step {
    pub fn perform(action: &str) -> Self {
        Self::Perform {
            action: action.to_string(),
        }
    }

    pub fn wait_until(condition: &str) -> Self {
        Self::WaitUntil {
            condition: condition.to_string(),
            timeout: None,
        }
    }

    pub fn wait_until_with_timeout(condition: &str, timeout: Duration) -> Self {
        Self::WaitUntil {
            condition: condition.to_string(),
            timeout: Some(timeout),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Perform { action } => action,
            Self::WaitUntil { condition, .. } => condition,
        }
    }

    pub(crate) fn execute<S: ActionSequencer>(
        &self,
        session: &mut S,
        default_timeout: Duration,
    ) -> Result<(), RunFailure> {
        let result = match self {
            Self::Perform { action } => session.perform(action),
            Self::WaitUntil { condition, timeout } => {
                session.wait_until(condition, timeout.unwrap_or(default_timeout))
            }
        };

        result.map_err(|e| RunFailure::step(self.name(), e))
    }
}

/// The scripted steps of one run, split by their role in the timing protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    /// Run before the measurement window opens. Not timed.
    pub prepare: Vec<Step>,
    /// The action that starts the measured computation
    pub trigger: String,
    /// The condition that signals the computation has finished
    pub completion: String,
    /// Run after the measurement window closes. Not timed.
    pub cleanup: Vec<Step>,
}

impl Workflow {
    /// The names of every step, in execution order.
    pub fn step_names(&self) -> Vec<String> {
        self.prepare
            .iter()
            .map(|s| s.name().to_string())
            .chain([self.trigger.clone(), self.completion.clone()])
            .chain(self.cleanup.iter().map(|s| s.name().to_string()))
            .collect()
    }
}
