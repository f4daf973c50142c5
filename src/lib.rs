//! tugsort: import sorting for JavaScript and TypeScript
//!
//! Reorders the import block of a module into configured groups, merges
//! duplicate imports and keeps every comment attached to the code it
//! describes. The engine lives in `tugsort-js`; this crate adds the
//! configuration file, the file-walking front door and diff output.

// Core infrastructure - re-exported from tugsort-core
pub use tugsort_core::collate;
pub use tugsort_core::error;
pub use tugsort_core::output;
pub use tugsort_core::range;
pub use tugsort_core::text;

// The engine
pub use tugsort_js as js;

// Front door
pub mod cli;
pub mod config;
pub mod diff;

// Error bridges - converts engine and config errors to TugSortError
mod error_bridges;

pub use error_bridges::FileSortError;
