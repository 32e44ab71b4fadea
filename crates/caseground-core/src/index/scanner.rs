//! Report file discovery

use crate::error::{CasegroundError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File name pattern produced by the report structuring step
pub const DEFAULT_REPORT_PATTERN: &str = "*_structured.json";

/// Find structured report files under `root` whose relative path matches `pattern`.
///
/// Hidden files and directories are skipped. Results are sorted so ingestion
/// order is stable. A `root` that is not a directory is
/// [`CasegroundError::ReportNotFound`].
pub fn find_report_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(pattern)?;
    if !root.is_dir() {
        return Err(CasegroundError::ReportNotFound(format!(
            "not a directory: {}",
            root.display()
        )));
    }
    let mut results = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string());

        if pattern.matches(&relative) {
            results.push(path.to_path_buf());
        }
    }

    results.sort();
    Ok(results)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
