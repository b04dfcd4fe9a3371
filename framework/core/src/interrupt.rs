use std::sync::Arc;

use tokio::sync::watch::{Receiver, Sender};

/// Signals that the benchmark should stop scheduling new runs.
///
/// The signal is sticky. Once raised, every existing and future listener observes it. A run that
/// is already in progress is never cancelled, the runner only checks between runs.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    sender: Arc<Sender<bool>>,
}

impl Default for InterruptHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self {
            sender: Arc::new(tokio::sync::watch::channel(false).0),
        }
    }

    pub fn interrupt(&self) {
        if !self.sender.send_replace(true) {
            log::info!("Interrupt requested, no further runs will be started");
        }
    }

    pub fn is_interrupted(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn new_listener(&self) -> InterruptListener {
        InterruptListener {
            receiver: self.sender.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InterruptListener {
    receiver: Receiver<bool>,
}

impl InterruptListener {
    /// Point in time check of the interrupt signal.
    pub fn is_interrupted(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until the interrupt signal is raised. It is safe to race this with another future, for
    /// example a delay between runs, so that the delay is cut short.
    pub async fn wait_for_interrupt(&mut self) {
        if self.receiver.wait_for(|interrupted| *interrupted).await.is_err() {
            // The handle was dropped without interrupting, nothing will ever raise the signal.
            std::future::pending::<()>().await;
        }
    }
}
