use indicatif::{ProgressBar, ProgressStyle};

/// A progress bar counting completed runs across all datasets.
pub(crate) fn start_progress(total_runs: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_runs as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} runs [{elapsed_precise}] {msg}",
    )
    .map(|style| style.progress_chars("#>-"))
    .unwrap_or_else(|e| {
        log::debug!("Falling back to the default progress style: {e}");
        ProgressStyle::default_bar()
    });
    pb.set_style(style);

    pb
}
