use crate::launch::launch_options;
use crate::script::{output_ready, BrowserAction, BrowserCondition, BrowserScript};
use headless_chrome::util::Wait;
use headless_chrome::{Browser, Tab};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use workflow_bench_runner::prelude::{
    ActionSequencer, DatasetInput, RunFailure, SessionConfig, SessionFactory, StepError,
    StepResult,
};

/// How long an action waits for the element it acts on.
const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Launches a fresh browser for every run.
pub struct ChromeSessionFactory {
    config: SessionConfig,
    script: Arc<BrowserScript>,
}

impl ChromeSessionFactory {
    pub fn new(config: &SessionConfig, script: BrowserScript) -> Self {
        Self {
            config: config.clone(),
            script: Arc::new(script),
        }
    }
}

impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    fn open(&self, input: &DatasetInput) -> Result<Self::Session, RunFailure> {
        let dataset = std::fs::canonicalize(&input.path).map_err(|e| RunFailure::Input {
            msg: format!("{}: {e}", input.path.display()),
        })?;

        let options = launch_options(&self.config).map_err(RunFailure::session)?;
        let browser = Browser::new(options).map_err(RunFailure::session)?;
        let tab = browser.new_tab().map_err(RunFailure::session)?;
        tab.set_default_timeout(ELEMENT_TIMEOUT);

        log::debug!("Opened browser session for {}", input.name);

        Ok(ChromeSession {
            browser,
            tab,
            script: self.script.clone(),
            url: self.config.url.clone(),
            dataset,
        })
    }
}

/// One browser process with a single tab, closed when dropped.
pub struct ChromeSession {
    browser: Browser,
    tab: Arc<Tab>,
    script: Arc<BrowserScript>,
    url: String,
    /// Absolute path of the dataset for this run
    dataset: PathBuf,
}

impl ChromeSession {
    fn run_action(&self, action: &BrowserAction) -> anyhow::Result<()> {
        match action {
            BrowserAction::OpenPage => {
                self.tab.navigate_to(&self.url)?.wait_until_navigated()?;
            }
            BrowserAction::Click { xpath } => {
                self.tab.wait_for_xpath(xpath)?.click()?;
            }
            BrowserAction::UploadDataset { selector } => {
                let dataset = self.dataset.to_string_lossy();
                self.tab
                    .wait_for_element(selector)?
                    .set_input_files(&[dataset.as_ref()])?;
            }
            BrowserAction::ExecuteScript { script } => {
                self.tab.evaluate(script, false)?;
            }
            BrowserAction::Reload => {
                self.tab.reload(false, None)?;
            }
        }

        Ok(())
    }

    fn condition_met(&self, condition: &BrowserCondition) -> bool {
        match condition {
            BrowserCondition::ElementPresent { selector } => {
                self.tab.find_element(selector).is_ok()
            }
            BrowserCondition::TextChanged { xpath, placeholder } => self
                .tab
                .find_element_by_xpath(xpath)
                .and_then(|element| element.get_inner_text())
                .is_ok_and(|text| output_ready(&text, placeholder)),
        }
    }
}

impl ActionSequencer for ChromeSession {
    fn perform(&mut self, action: &str) -> StepResult {
        let browser_action = self.script.action(action)?.clone();
        log::debug!("Performing {action}");

        self.run_action(&browser_action)
            .map_err(|e| StepError::failed(format!("{e:#}")))
    }

    fn wait_until(&mut self, condition: &str, timeout: Duration) -> StepResult {
        let browser_condition = self.script.condition(condition)?.clone();
        log::debug!("Waiting up to {timeout:?} for {condition}");

        Wait::with_timeout(timeout)
            .until(|| self.condition_met(&browser_condition).then_some(()))
            .map_err(|_| StepError::TimedOut { timeout })
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            log::debug!("Tab did not close cleanly: {e}");
        }
        log::debug!(
            "Closing browser session, process id {:?}",
            self.browser.get_process_id()
        );
    }
}
