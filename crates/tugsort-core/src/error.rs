//! Error types and error code constants for tugsort.
//!
//! This module provides a unified error type (`TugSortError`) that bridges
//! domain-specific errors from the parser, the sorting engine, and the
//! configuration layer into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or configuration (bad input from caller)
//! - `3`: Policy errors (an import matches no group of the import order)
//! - `4`: Apply errors (failed to read or write a file)
//! - `5`: Check failed (files would be changed by sorting)
//! - `6`: Parse errors (the import region could not be understood)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `TugSortError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for TugSortError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or configuration from caller.
    InvalidArguments = 2,
    /// The import order policy cannot place an import.
    PolicyError = 3,
    /// Failed to read or write files.
    ApplyError = 4,
    /// Check mode found files that are not sorted.
    CheckFailed = 5,
    /// The import region could not be parsed.
    ParseError = 6,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum TugSortError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        path: Option<String>,
    },

    /// An import matches no group of the import order.
    #[error("{file}:{line}: import from '{module}' matches no group in the import order")]
    UnmatchedGroup {
        file: String,
        module: String,
        line: u32,
    },

    /// The import region of a file could not be parsed.
    #[error("{file}:{line}: parse error: {message}")]
    ParseError {
        file: String,
        line: u32,
        message: String,
    },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to read or write a file.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Check mode found unsorted files.
    #[error("{} file(s) would be reordered", .files.len())]
    CheckFailed { files: Vec<String> },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TugSortError> for OutputErrorCode {
    fn from(err: &TugSortError) -> Self {
        match err {
            TugSortError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TugSortError::InvalidConfig { .. } => OutputErrorCode::InvalidArguments,
            TugSortError::UnmatchedGroup { .. } => OutputErrorCode::PolicyError,
            TugSortError::ParseError { .. } => OutputErrorCode::ParseError,
            TugSortError::FileNotFound { .. } => OutputErrorCode::ApplyError,
            TugSortError::ApplyError { .. } => OutputErrorCode::ApplyError,
            TugSortError::CheckFailed { .. } => OutputErrorCode::CheckFailed,
            TugSortError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TugSortError> for OutputErrorCode {
    fn from(err: TugSortError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TugSortError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TugSortError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        TugSortError::FileNotFound { path: path.into() }
    }

    /// Create an apply error tied to a file.
    pub fn apply(message: impl Into<String>, file: impl Into<String>) -> Self {
        TugSortError::ApplyError {
            message: message.into(),
            file: Some(file.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TugSortError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// The file this error concerns, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            TugSortError::UnmatchedGroup { file, .. } | TugSortError::ParseError { file, .. } => {
                Some(file)
            }
            TugSortError::FileNotFound { path } => Some(path),
            TugSortError::ApplyError { file, .. } => file.as_deref(),
            TugSortError::InvalidConfig { path, .. } => path.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn unmatched_group_maps_to_policy_error() {
            let err = TugSortError::UnmatchedGroup {
                file: "a.ts".to_string(),
                module: "./types".to_string(),
                line: 3,
            };
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::PolicyError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn invalid_config_maps_to_invalid_arguments() {
            let err = TugSortError::InvalidConfig {
                message: "bad regex".to_string(),
                path: Some("tugsort.toml".to_string()),
            };
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.file(), Some("tugsort.toml"));
        }

        #[test]
        fn check_failed_maps_to_check_failed() {
            let err = TugSortError::CheckFailed {
                files: vec!["a.ts".to_string()],
            };
            assert_eq!(err.error_code().code(), 5);
        }

        #[test]
        fn parse_error_maps_to_parse_error() {
            let err = TugSortError::ParseError {
                file: "a.js".to_string(),
                line: 1,
                message: "expected 'from'".to_string(),
            };
            assert_eq!(err.error_code().code(), 6);
        }

        #[test]
        fn internal_error_maps_to_internal_error() {
            let err = TugSortError::internal("unexpected state");
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }

        #[test]
        fn io_failures_map_to_apply_error() {
            assert_eq!(
                TugSortError::file_not_found("gone.ts").error_code(),
                OutputErrorCode::ApplyError
            );
            assert_eq!(
                TugSortError::apply("permission denied", "ro.ts").error_code(),
                OutputErrorCode::ApplyError
            );
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn unmatched_group_display() {
            let err = TugSortError::UnmatchedGroup {
                file: "src/a.ts".to_string(),
                module: "./types".to_string(),
                line: 3,
            };
            assert_eq!(
                err.to_string(),
                "src/a.ts:3: import from './types' matches no group in the import order"
            );
        }

        #[test]
        fn check_failed_display() {
            let err = TugSortError::CheckFailed {
                files: vec!["a.ts".to_string(), "b.ts".to_string()],
            };
            assert_eq!(err.to_string(), "2 file(s) would be reordered");
        }
    }

    #[test]
    fn display_shows_code() {
        assert_eq!(format!("{}", OutputErrorCode::InvalidArguments), "2");
        assert_eq!(format!("{}", OutputErrorCode::PolicyError), "3");
        assert_eq!(format!("{}", OutputErrorCode::InternalError), "10");
    }
}
