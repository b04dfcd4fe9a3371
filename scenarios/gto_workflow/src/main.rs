use workflow_bench_chrome::prelude::*;

const WORKFLOW_URL: &str = "http://localhost:8082/workflow";

const IMPORT_BUTTON: &str = "/html/body/div/div[1]/div/div/div[2]/div/div[3]/button[2]";
const CONFIG_MODAL_BUTTON: &str = "/html/body/div[2]/div[3]/div/div[1]/div[1]/div/div/div/button[2]";
const UPLOAD_MODAL_BUTTON: &str = "/html/body/div[2]/div[3]/div/div[1]/div[2]/label";
const FILE_INPUT: &str = "input[type='file']";
const FINAL_IMPORT_BUTTON: &str = "/html/body/div[2]/div[3]/div/div[2]/button[2]";
const OUTPUT_TEXT: &str = "/html/body/div/div/div/div/div[2]/div/div[3]/div[2]/p";
const OUTPUT_PLACEHOLDER: &str = "No output available yet";

fn click(xpath: &str) -> BrowserAction {
    BrowserAction::Click {
        xpath: xpath.to_string(),
    }
}

fn browser_script() -> BrowserScript {
    BrowserScript::new()
        .use_action("access_workflow_page", BrowserAction::OpenPage)
        .use_action("click_import_button", click(IMPORT_BUTTON))
        .use_action("click_config_modal_button", click(CONFIG_MODAL_BUTTON))
        .use_action("click_upload_modal_button", click(UPLOAD_MODAL_BUTTON))
        .use_action(
            "upload_file",
            BrowserAction::UploadDataset {
                selector: FILE_INPUT.to_string(),
            },
        )
        .use_action("click_final_import_button", click(FINAL_IMPORT_BUTTON))
        .use_action(
            "clear_local_storage",
            BrowserAction::ExecuteScript {
                script: "localStorage.clear();".to_string(),
            },
        )
        .use_action("refresh_page", BrowserAction::Reload)
        .use_condition(
            "page_loaded",
            BrowserCondition::ElementPresent {
                selector: "body".to_string(),
            },
        )
        .use_condition(
            "wait_for_output_change",
            BrowserCondition::TextChanged {
                xpath: OUTPUT_TEXT.to_string(),
                placeholder: OUTPUT_PLACEHOLDER.to_string(),
            },
        )
}

fn main() -> WorkflowBenchResult<()> {
    let builder =
        WorkflowDefinitionBuilder::<ChromeSessionFactory>::new_with_init(env!("CARGO_PKG_NAME"))
            .use_dataset_mode(
                "vs_local",
                &[
                    "AllMis_2400.json",
                    "BraLanc_464.json",
                    "HomoSapiens_3300.json",
                    "HydCol_1000.json",
                ],
            )
            .use_dataset_mode("vs_galaxy", &["BraLanc_464_Galaxy.json"])
            .with_default_trials(3)
            .with_default_url(WORKFLOW_URL)
            .with_process_name("chrome")
            .use_prepare_step(Step::perform("access_workflow_page"))
            .use_prepare_step(Step::wait_until("page_loaded"))
            .use_prepare_step(Step::perform("click_import_button"))
            .use_prepare_step(Step::perform("click_config_modal_button"))
            .use_prepare_step(Step::perform("click_upload_modal_button"))
            .use_prepare_step(Step::perform("upload_file"))
            .use_trigger("click_final_import_button")
            .use_completion("wait_for_output_change")
            .use_cleanup_step(Step::perform("clear_local_storage"))
            .use_cleanup_step(Step::perform("refresh_page"))
            .use_cleanup_step(Step::wait_until("page_loaded"))
            .use_session_factory(|config| {
                Ok(ChromeSessionFactory::new(config, browser_script()))
            });

    let outcome = run(builder)?;

    if outcome.interrupted {
        log::warn!("Performance testing was interrupted");
    } else {
        log::info!(
            "Performance testing completed in {} mode, results in {}",
            outcome.report.metadata.mode,
            outcome.csv_path.display()
        );
    }

    Ok(())
}
