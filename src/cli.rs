//! CLI front door helpers.
//!
//! Collects files, sorts them in parallel and builds the reports the binary
//! prints. Every function returns `Result<T, TugSortError>` so the binary can
//! map failures to stable exit codes.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};
use tugsort_core::error::TugSortError;
use tugsort_core::output::{FileReport, FileStatus, SortResponse};
use tugsort_js::{sort_imports, SortOutcome};
use walkdir::WalkDir;

use crate::config::SortConfig;
use crate::diff::unified_diff;
use crate::error_bridges::FileSortError;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "target"];

/// Command-line settings that take precedence over `tugsort.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub import_order: Option<Vec<String>>,
    pub case_sensitive: bool,
    pub no_sort_specifiers: bool,
    pub no_merge: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut SortConfig) {
        if let Some(order) = &self.import_order {
            config.import_order = order.clone();
        }
        if self.case_sensitive {
            config.case_sensitive = true;
        }
        if self.no_sort_specifiers {
            config.sort_specifiers = false;
        }
        if self.no_merge {
            config.merge_duplicates = false;
        }
    }
}

/// Outcome of sorting one file.
#[derive(Debug)]
pub struct FileResult {
    pub path: PathBuf,
    pub original: String,
    pub outcome: Result<SortOutcome, TugSortError>,
}

impl FileResult {
    /// Path as shown in reports.
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub fn changed(&self) -> bool {
        self.outcome.as_ref().is_ok_and(|outcome| outcome.changed)
    }

    /// Unified diff of the change, empty if unchanged or failed.
    pub fn diff(&self) -> String {
        match &self.outcome {
            Ok(outcome) if outcome.changed => {
                unified_diff(&self.display_path(), &self.original, &outcome.text)
            }
            _ => String::new(),
        }
    }

    fn report(&self) -> FileReport {
        match &self.outcome {
            Ok(outcome) if outcome.skipped => {
                FileReport::new(self.display_path(), FileStatus::Skipped)
            }
            Ok(outcome) if outcome.changed => {
                FileReport::new(self.display_path(), FileStatus::Changed)
            }
            Ok(_) => FileReport::new(self.display_path(), FileStatus::Unchanged),
            Err(err) => FileReport::failed(self.display_path(), err),
        }
    }
}

/// Expand `paths` into the files to sort.
///
/// Files named explicitly are always included; directories are walked and
/// filtered by the configured extensions. The result is sorted and free of
/// duplicates.
pub fn collect_files(paths: &[PathBuf], config: &SortConfig) -> Result<Vec<PathBuf>, TugSortError> {
    if paths.is_empty() {
        return Err(TugSortError::invalid_args("no paths given"));
    }

    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(TugSortError::file_not_found(path.display().to_string()));
        }

        for entry in WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| SKIPPED_DIRS.contains(&name))
            })
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && config.handles(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "collected files");
    Ok(files)
}

/// Read and sort one file. Nothing is written.
pub fn sort_file(path: &Path, config: &SortConfig) -> FileResult {
    let display = path.display().to_string();
    let original = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return FileResult {
                path: path.to_path_buf(),
                original: String::new(),
                outcome: Err(TugSortError::apply(format!("failed to read file: {e}"), display)),
            }
        }
    };

    let outcome = sort_imports(&original, &config.sort_options(path))
        .map_err(|error| TugSortError::from(FileSortError::new(display, error)));
    FileResult {
        path: path.to_path_buf(),
        original,
        outcome,
    }
}

/// Sort every file in parallel. Results come back in input order.
pub fn sort_files(files: &[PathBuf], config: &SortConfig) -> Vec<FileResult> {
    files.par_iter().map(|path| sort_file(path, config)).collect()
}

/// Write every changed file back. Returns the number of files written.
pub fn write_changes(results: &[FileResult]) -> Result<usize, TugSortError> {
    let mut written = 0;
    for result in results {
        if let Ok(outcome) = &result.outcome {
            if outcome.changed {
                fs::write(&result.path, &outcome.text).map_err(|e| {
                    TugSortError::apply(format!("failed to write file: {e}"), result.display_path())
                })?;
                info!(file = %result.path.display(), "rewrote imports");
                written += 1;
            }
        }
    }
    Ok(written)
}

/// JSON report for a run.
pub fn report(results: &[FileResult], applied: bool) -> SortResponse {
    SortResponse::new(results.iter().map(FileResult::report).collect(), applied)
}

/// Fail with `CheckFailed` if any file would change.
pub fn check(results: &[FileResult]) -> Result<(), TugSortError> {
    let files: Vec<String> = results
        .iter()
        .filter(|result| result.changed())
        .map(FileResult::display_path)
        .collect();
    if files.is_empty() {
        Ok(())
    } else {
        Err(TugSortError::CheckFailed { files })
    }
}

/// Remove the first failed result, in path order, and return its error.
pub fn take_first_error(results: &mut Vec<FileResult>) -> Option<TugSortError> {
    let index = results.iter().position(|result| result.outcome.is_err())?;
    results.remove(index).outcome.err()
}
