//! JSON output types and serialization for CLI responses.
//!
//! These types form the machine-readable contract of `tugsort sort
//! --format json`.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (files sorted by path)
//! 3. **Nullable vs absent:** Absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, TugSortError};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Location in a source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File path as given on the command line.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Location {
            file: file.into(),
            line,
        }
    }
}

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a TugSortError.
    pub fn from_error(err: &TugSortError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let (details, location) = match err {
            TugSortError::UnmatchedGroup { file, module, line } => (
                Some(serde_json::json!({ "module": module })),
                Some(Location::new(file.clone(), *line)),
            ),
            TugSortError::ParseError { file, line, .. } => {
                (None, Some(Location::new(file.clone(), *line)))
            }
            TugSortError::CheckFailed { files } => {
                (Some(serde_json::json!({ "files": files })), None)
            }
            _ => (None, None),
        };

        ErrorInfo {
            code,
            message,
            details,
            location,
        }
    }
}

/// Outcome of sorting one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Imports were (or would be) reordered.
    Changed,
    /// Imports were already in order.
    Unchanged,
    /// The file opted out or has nothing sortable.
    Skipped,
    /// The file could not be processed; it was left untouched.
    Error,
}

/// Per-file entry of a sort response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// File path as given on the command line.
    pub path: String,
    /// What happened to the file.
    pub status: FileStatus,
    /// Error details when `status` is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl FileReport {
    /// Report for a file that was processed without error.
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        FileReport {
            path: path.into(),
            status,
            error: None,
        }
    }

    /// Report for a file that failed.
    pub fn failed(path: impl Into<String>, err: &TugSortError) -> Self {
        FileReport {
            path: path.into(),
            status: FileStatus::Error,
            error: Some(ErrorInfo::from_error(err)),
        }
    }
}

/// Aggregate counts of a sort response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSummary {
    pub files_checked: u32,
    pub files_changed: u32,
    pub files_failed: u32,
}

/// Response for `tugsort sort --format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortResponse {
    /// "ok" when every file was processed, "error" otherwise.
    pub status: String,
    pub schema_version: String,
    /// Whether changed files were written back.
    pub applied: bool,
    pub summary: SortSummary,
    pub files: Vec<FileReport>,
}

impl SortResponse {
    /// Build a response; files are ordered by path for determinism.
    pub fn new(mut files: Vec<FileReport>, applied: bool) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let mut summary = SortSummary::default();
        for file in &files {
            summary.files_checked += 1;
            match file.status {
                FileStatus::Changed => summary.files_changed += 1,
                FileStatus::Error => summary.files_failed += 1,
                FileStatus::Unchanged | FileStatus::Skipped => {}
            }
        }
        let status = if summary.files_failed == 0 {
            "ok"
        } else {
            "error"
        };
        SortResponse {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            applied,
            summary,
            files,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Wrap an error for output.
    pub fn from_error(err: &TugSortError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_response_counts_and_orders_files() {
        let err = TugSortError::internal("boom");
        let response = SortResponse::new(
            vec![
                FileReport::new("b.ts", FileStatus::Changed),
                FileReport::failed("c.ts", &err),
                FileReport::new("a.ts", FileStatus::Unchanged),
            ],
            false,
        );
        assert_eq!(response.status, "error");
        assert_eq!(
            response.summary,
            SortSummary {
                files_checked: 3,
                files_changed: 1,
                files_failed: 1,
            }
        );
        let paths: Vec<_> = response.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.ts", "b.ts", "c.ts"]);
    }

    #[test]
    fn status_first_and_snake_case() {
        let response = SortResponse::new(vec![FileReport::new("a.ts", FileStatus::Skipped)], true);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with(r#"{"status":"ok""#));
        assert!(json.contains(r#""status":"skipped""#));
        assert!(!json.contains("\"error\":"));
    }

    #[test]
    fn unmatched_group_error_info_has_location() {
        let err = TugSortError::UnmatchedGroup {
            file: "src/a.ts".to_string(),
            module: "./t".to_string(),
            line: 4,
        };
        let info = ErrorInfo::from_error(&err);
        assert_eq!(info.code, 3);
        assert_eq!(info.location, Some(Location::new("src/a.ts", 4)));
        assert_eq!(info.details, Some(serde_json::json!({ "module": "./t" })));
    }

    #[test]
    fn emit_compact_is_single_line() {
        let response = ErrorResponse::from_error(&TugSortError::invalid_args("no paths"));
        let mut buf = Vec::new();
        emit_response_compact(&response, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("invalid arguments: no paths"));
    }
}
