//! Core infrastructure for tugsort.
//!
//! This crate provides language-agnostic infrastructure:
//! - Byte spans, range merging and splicing for rewriting a file region
//! - Line indexing for byte offset to line:column conversions
//! - Natural (numeric-aware) string collation
//! - Error types and error codes
//! - JSON output types for CLI responses

pub mod collate;
pub mod error;
pub mod output;
pub mod range;
pub mod text;
