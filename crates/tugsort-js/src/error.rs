// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Errors produced by the sorting engine.

use thiserror::Error;

use crate::parser::ParseError;

/// Error type for one sorting invocation.
///
/// Every variant means the file is left unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// The import region could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse { line: u32, message: String },

    /// A type import matches no type-scoped group and there is no `<TYPES>`
    /// catch-all, or a value import matches no group at all.
    #[error("import from '{module}' on line {line} matches no group in the import order")]
    UnmatchedGroup { module: String, line: u32 },

    /// An import order or side-effect pattern is not a valid regular
    /// expression.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The engine reached an inconsistent state.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SortError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        SortError::Internal {
            message: message.into(),
        }
    }
}

impl From<ParseError> for SortError {
    fn from(err: ParseError) -> Self {
        SortError::Parse {
            line: err.line,
            message: err.message,
        }
    }
}

/// Result type for engine operations.
pub type SortResult<T> = Result<T, SortError>;
