// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Sorting policy and its normalization.

use crate::ast::Dialect;
use crate::error::{SortError, SortResult};
use crate::patterns;

/// Reserved order entry for Node.js built-in modules.
pub const BUILTIN_MODULES: &str = "<BUILTIN_MODULES>";
/// Reserved order entry for every module no other entry matches.
pub const THIRD_PARTY_MODULES: &str = "<THIRD_PARTY_MODULES>";
/// Short alias of [`THIRD_PARTY_MODULES`].
pub const THIRD_PARTY_ALIAS: &str = "<THIRD_PARTY>";
/// Alias of [`BUILTIN_MODULES`].
pub const BUILTIN_ALIAS: &str = "<BUILTIN>";
/// Prefix marking an entry as applying to type-only imports.
pub const TYPES_PREFIX: &str = "<TYPES>";
/// Default skip marker comment.
pub const DEFAULT_SKIP_MARKER: &str = "tugsort-ignore";
/// Comment that disables sorting for a whole file.
pub const IGNORE_FILE_MARKER: &str = "tugsort-ignore-file";

/// The default import order: built-ins, third party, blank line, relative.
pub fn default_import_order() -> Vec<String> {
    vec![
        BUILTIN_MODULES.to_string(),
        THIRD_PARTY_MODULES.to_string(),
        String::new(),
        "^[.]".to_string(),
    ]
}

/// Options controlling one sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Ordered group patterns. Empty means "keep the original order".
    pub import_order: Vec<String>,
    pub case_sensitive: bool,
    pub sort_specifiers: bool,
    pub merge_duplicates: bool,
    pub combine_type_and_value: bool,
    /// Side-effect imports whose source matches one of these patterns are
    /// sorted like other imports.
    pub side_effect_sortable: Vec<String>,
    /// A statement whose preceding comment equals one of these stays put.
    pub skip_markers: Vec<String>,
    pub dialect: Dialect,
}

impl Default for SortOptions {
    fn default() -> Self {
        SortOptions {
            import_order: default_import_order(),
            case_sensitive: false,
            sort_specifiers: true,
            merge_duplicates: true,
            combine_type_and_value: true,
            side_effect_sortable: Vec::new(),
            skip_markers: vec![DEFAULT_SKIP_MARKER.to_string()],
            dialect: Dialect::TypeScript,
        }
    }
}

impl SortOptions {
    /// A policy that changes nothing: no order, no merging, no specifier
    /// sorting.
    pub fn no_op() -> Self {
        SortOptions {
            import_order: Vec::new(),
            sort_specifiers: false,
            merge_duplicates: false,
            combine_type_and_value: false,
            ..SortOptions::default()
        }
    }

    /// The import order with `<THIRD_PARTY_MODULES>` guaranteed present.
    ///
    /// A non-empty order that lacks it gets it inserted at the front; an
    /// empty order stays empty.
    pub fn normalized_order(&self) -> Vec<String> {
        let mut order = self.import_order.clone();
        let has_third_party = order
            .iter()
            .any(|entry| matches!(entry.trim(), THIRD_PARTY_MODULES | THIRD_PARTY_ALIAS));
        if !order.is_empty() && !has_third_party {
            order.insert(0, THIRD_PARTY_MODULES.to_string());
        }
        order
    }

    /// Check that every side-effect pattern compiles.
    ///
    /// Import order patterns are checked when the order is parsed.
    pub fn validate(&self) -> SortResult<()> {
        for pattern in &self.side_effect_sortable {
            patterns::compile(pattern).map_err(|e| SortError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Node.js built-in module names (without the `node:` prefix).
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// True if `source` names a Node.js built-in module (`fs`, `fs/promises`,
/// `node:test`, ...).
pub fn is_builtin_module(source: &str) -> bool {
    if source.starts_with("node:") {
        return true;
    }
    let root = source.split('/').next().unwrap_or(source);
    NODE_BUILTINS.contains(&root)
}
