//! Error bridge implementations for engine and configuration errors.
//!
//! Engine errors do not know which file they concern, so the CLI wraps them
//! in a [`FileSortError`] before converting to the unified `TugSortError`.

use tugsort_core::error::TugSortError;
use tugsort_js::SortError;

use crate::config::ConfigError;

/// A [`SortError`] tied to the file being sorted.
#[derive(Debug)]
pub struct FileSortError {
    pub file: String,
    pub error: SortError,
}

impl FileSortError {
    pub fn new(file: impl Into<String>, error: SortError) -> Self {
        FileSortError {
            file: file.into(),
            error,
        }
    }
}

// ============================================================================
// Bridge: SortError -> TugSortError
// ============================================================================

impl From<FileSortError> for TugSortError {
    fn from(err: FileSortError) -> Self {
        let FileSortError { file, error } = err;
        match error {
            SortError::Parse { line, message } => TugSortError::ParseError {
                file,
                line,
                message,
            },
            SortError::UnmatchedGroup { module, line } => {
                TugSortError::UnmatchedGroup { file, module, line }
            }
            SortError::InvalidPattern { pattern, message } => TugSortError::InvalidConfig {
                message: format!("invalid pattern '{pattern}': {message}"),
                path: None,
            },
            SortError::Internal { message } => TugSortError::InternalError {
                message: format!("{file}: {message}"),
            },
        }
    }
}

// ============================================================================
// Bridge: ConfigError -> TugSortError
// ============================================================================

impl From<ConfigError> for TugSortError {
    fn from(err: ConfigError) -> Self {
        let path = err.path().map(|path| path.display().to_string());
        match err {
            ConfigError::Serialize { message } => TugSortError::internal(message),
            other => TugSortError::InvalidConfig {
                message: other.to_string(),
                path,
            },
        }
    }
}
