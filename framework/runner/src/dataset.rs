use std::path::{Path, PathBuf};

/// A dataset file that exists and can be used to drive runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInput {
    /// The file name, used to identify the dataset in results
    pub name: String,
    pub path: PathBuf,
    pub file_size_bytes: u64,
}

impl DatasetInput {
    /// Locate a dataset file in `data_dir`.
    ///
    /// A missing or unreadable file is not an error for the benchmark, it is logged and `None` is
    /// returned so that the dataset is skipped.
    pub fn resolve(data_dir: &Path, file_name: &str) -> Option<Self> {
        let path = data_dir.join(file_name);

        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => Some(Self {
                name: file_name.to_string(),
                path,
                file_size_bytes: metadata.len(),
            }),
            Ok(_) => {
                log::warn!("{} is not a file, skipping...", path.display());
                None
            }
            Err(e) => {
                log::warn!("{} not found, skipping... ({e})", path.display());
                None
            }
        }
    }
}
