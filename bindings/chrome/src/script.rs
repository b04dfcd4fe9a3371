use std::collections::HashMap;
use workflow_bench_runner::prelude::StepError;

/// Something a browser session can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    /// Load the workflow page from the session URL
    OpenPage,
    /// Click the element at an XPath, once it is present
    Click { xpath: String },
    /// Attach the run's dataset file to a file input
    UploadDataset { selector: String },
    ExecuteScript { script: String },
    Reload,
}

/// Something a browser session can wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCondition {
    /// An element matching a CSS selector is in the page
    ElementPresent { selector: String },
    /// The text at an XPath is non-empty and differs from the placeholder
    TextChanged { xpath: String, placeholder: String },
}

/// The named actions and conditions that a workflow's steps refer to.
#[derive(Debug, Clone, Default)]
pub struct BrowserScript {
    actions: HashMap<String, BrowserAction>,
    conditions: HashMap<String, BrowserCondition>,
}

impl BrowserScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Panics if the name is already registered.
    pub fn use_action(mut self, name: &str, action: BrowserAction) -> Self {
        if self.actions.insert(name.to_string(), action).is_some() {
            panic!("Action [{}] is already registered", name);
        }
        self
    }

    /// Register a condition. Panics if the name is already registered.
    pub fn use_condition(mut self, name: &str, condition: BrowserCondition) -> Self {
        if self.conditions.insert(name.to_string(), condition).is_some() {
            panic!("Condition [{}] is already registered", name);
        }
        self
    }

    pub fn action(&self, name: &str) -> Result<&BrowserAction, StepError> {
        self.actions.get(name).ok_or_else(|| StepError::UnknownAction {
            name: name.to_string(),
        })
    }

    pub fn condition(&self, name: &str) -> Result<&BrowserCondition, StepError> {
        self.conditions
            .get(name)
            .ok_or_else(|| StepError::UnknownCondition {
                name: name.to_string(),
            })
    }
}

/// Whether the output text shows a finished computation: it is non-empty and no longer the
/// placeholder. Surrounding whitespace is ignored.
pub fn output_ready(text: &str, placeholder: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text != placeholder.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn script() -> BrowserScript {
        BrowserScript::new()
            .use_action(
                "click_import_button",
                BrowserAction::Click {
                    xpath: "//button[2]".to_string(),
                },
            )
            .use_condition(
                "page_loaded",
                BrowserCondition::ElementPresent {
                    selector: "body".to_string(),
                },
            )
    }

    #[test]
    fn lookup_registered_names() {
        let script = script();

        assert_eq!(
            &BrowserAction::Click {
                xpath: "//button[2]".to_string()
            },
            script.action("click_import_button").unwrap()
        );
        assert_eq!(
            &BrowserCondition::ElementPresent {
                selector: "body".to_string()
            },
            script.condition("page_loaded").unwrap()
        );
    }

    #[test]
    fn unknown_names_are_step_errors() {
        let script = script();

        assert_eq!(
            StepError::UnknownAction {
                name: "page_loaded".to_string()
            },
            script.action("page_loaded").unwrap_err()
        );
        assert_eq!(
            StepError::UnknownCondition {
                name: "click_import_button".to_string()
            },
            script.condition("click_import_button").unwrap_err()
        );
    }

    #[test]
    #[should_panic(expected = "Action [click_import_button] is already registered")]
    fn duplicate_action_panics() {
        script().use_action("click_import_button", BrowserAction::Reload);
    }

    #[test]
    fn output_ready_ignores_placeholder_and_blank_text() {
        let placeholder = "No output available yet";

        assert!(!output_ready("No output available yet", placeholder));
        assert!(!output_ready("   \n", placeholder));
        assert!(!output_ready("", placeholder));
        assert!(output_ready("Sequences: 464", placeholder));
        assert!(output_ready(
            "Result: No output available yet for step 2; 464 sequences",
            placeholder
        ));
        assert!(!output_ready("  No output available yet\n", placeholder));
        assert!(output_ready("Sequences: 464", ""));
        assert!(!output_ready("", ""));
    }
}
