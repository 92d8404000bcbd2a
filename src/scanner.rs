use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;

/// List every file under `root` in a stable order.
/// Applies the config's exclude prefixes (relative to `root`). Unreadable
/// entries are skipped. Non-documents are listed too; the loader ignores them.
///
/// # Errors
///
/// Returns `Error::DirectoryNotFound` if `root` is not a directory.
pub fn scan(root: &Path, config: &Config) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        return Err(Error::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let files = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| {
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            return config.should_scan(&relative.to_string_lossy());
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    return Ok(files);
}
