use std::path::{Path, PathBuf};

use crate::error::{NrmacError, Result};

/// Files from `files` whose name ends with `extension`, in input order.
///
/// The match is a plain case-sensitive suffix test on the path text.
pub fn candidate_files(files: &[PathBuf], extension: &str) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|f| f.to_str().is_some_and(|s| s.ends_with(extension)))
        .cloned()
        .collect()
}

/// Pre-flight check run before a batch starts.
pub fn check_continue(files: &[PathBuf], extension: &str) -> Result<()> {
    if candidate_files(files, extension).is_empty() {
        return Err(NrmacError::NoInput);
    }
    Ok(())
}

/// Read a file list with one path per line. Blank lines are skipped.
pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}
