// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Group assignment and sorting.
//!
//! An [`ImportOrder`] is an ordered list of group patterns and separators.
//! Each statement goes to the first group whose pattern matches its module
//! source; groups are emitted in order with a blank line wherever the order
//! has an empty entry.
//!
//! ## Entry syntax
//!
//! | Entry | Meaning |
//! |-------|---------|
//! | `""` (or whitespace) | Blank line between groups |
//! | `<BUILTIN_MODULES>` | Node.js built-ins, `node:*` |
//! | `<THIRD_PARTY_MODULES>` / `<THIRD_PARTY>` | Everything unmatched |
//! | `<TYPES>` | Type-only imports not matched elsewhere |
//! | `<TYPES>pattern` | Type-only imports matching `pattern` |
//! | anything else | Regular expression on the module source |
//!
//! When the order contains any `<TYPES>` entry, type-only statements can
//! only land in `<TYPES>` entries, and value statements only in the others.

use std::cmp::Ordering;

use regex::Regex;
use tracing::debug;
use tugsort_core::collate::natural_cmp;

use crate::error::{SortError, SortResult};
use crate::model::{Flavor, ImportStatement, OutputItem};
use crate::options::{
    is_builtin_module, SortOptions, BUILTIN_ALIAS, BUILTIN_MODULES, THIRD_PARTY_ALIAS,
    THIRD_PARTY_MODULES, TYPES_PREFIX,
};
use crate::patterns;

/// What a group entry matches.
#[derive(Debug, Clone)]
pub enum PatternKind {
    Regex(Regex),
    Builtin,
    /// Fallback for anything not matched by a specific entry.
    ThirdParty,
    /// Bare `<TYPES>`: fallback for type-only statements.
    Any,
}

/// One group of the import order.
#[derive(Debug, Clone)]
pub struct GroupPattern {
    /// The entry as written.
    pub raw: String,
    pub kind: PatternKind,
    /// Entry applies to type-only statements.
    pub type_scoped: bool,
}

impl GroupPattern {
    fn is_fallback(&self) -> bool {
        matches!(self.kind, PatternKind::ThirdParty | PatternKind::Any)
    }

    fn matches_specific(&self, source: &str) -> bool {
        match &self.kind {
            PatternKind::Regex(regex) => regex.is_match(source),
            PatternKind::Builtin => is_builtin_module(source),
            PatternKind::ThirdParty | PatternKind::Any => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum OrderEntry {
    Group(GroupPattern),
    Separator,
}

/// Parsed import order policy.
#[derive(Debug, Clone, Default)]
pub struct ImportOrder {
    entries: Vec<OrderEntry>,
}

impl ImportOrder {
    /// Parse order entries, compiling regular expressions.
    ///
    /// # Errors
    ///
    /// `SortError::InvalidPattern` for an entry that is not a valid regex.
    pub fn parse(patterns: &[String]) -> SortResult<Self> {
        let entries = patterns
            .iter()
            .map(|raw| parse_entry(raw.as_str()))
            .collect::<SortResult<Vec<_>>>()?;
        Ok(ImportOrder { entries })
    }

    /// True if there is no ordering policy.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OrderEntry] {
        &self.entries
    }

    /// True if any entry is `<TYPES>`-scoped.
    pub fn has_type_scopes(&self) -> bool {
        self.groups().any(|(_, group)| group.type_scoped)
    }

    fn groups(&self) -> impl Iterator<Item = (usize, &GroupPattern)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                OrderEntry::Group(group) => Some((index, group)),
                OrderEntry::Separator => None,
            })
    }

    /// Index of the entry `statement` belongs to.
    fn assign(&self, statement: &ImportStatement) -> SortResult<usize> {
        let type_scoped = statement.flavor == Flavor::Type && self.has_type_scopes();
        let eligible = || {
            self.groups()
                .filter(move |(_, group)| group.type_scoped == type_scoped)
        };

        let found = eligible()
            .find(|(_, group)| !group.is_fallback() && group.matches_specific(&statement.source))
            .or_else(|| {
                eligible().find(|(_, group)| matches!(group.kind, PatternKind::ThirdParty))
            })
            .or_else(|| eligible().find(|(_, group)| matches!(group.kind, PatternKind::Any)));

        found.map(|(index, _)| index).ok_or_else(|| SortError::UnmatchedGroup {
            module: statement.source.clone(),
            line: statement.start_line,
        })
    }
}

fn parse_entry(raw: &str) -> SortResult<OrderEntry> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(OrderEntry::Separator);
    }

    let (type_scoped, body) = match trimmed.strip_prefix(TYPES_PREFIX) {
        Some(rest) => (true, rest.trim()),
        None => (false, trimmed),
    };

    let kind = match body {
        "" if type_scoped => PatternKind::Any,
        BUILTIN_MODULES | BUILTIN_ALIAS => PatternKind::Builtin,
        THIRD_PARTY_MODULES | THIRD_PARTY_ALIAS => PatternKind::ThirdParty,
        pattern => PatternKind::Regex(patterns::compile(pattern).map_err(|e| {
            SortError::InvalidPattern {
                pattern: raw.to_string(),
                message: e.to_string(),
            }
        })?),
    };

    Ok(OrderEntry::Group(GroupPattern {
        raw: raw.to_string(),
        kind,
        type_scoped,
    }))
}

/// Assign statements to groups, sort each group, and lay groups out with
/// separators.
///
/// With an empty order, statements keep their order and no separators are
/// added; specifiers are still sorted when `sort_specifiers` is on.
pub fn assign_and_sort(
    statements: Vec<ImportStatement>,
    order: &ImportOrder,
    options: &SortOptions,
) -> SortResult<Vec<OutputItem>> {
    let finish = |mut statement: ImportStatement| {
        if options.sort_specifiers {
            sort_specifiers(&mut statement, options.case_sensitive);
        }
        OutputItem::Statement(statement)
    };

    if order.is_empty() {
        return Ok(statements.into_iter().map(finish).collect());
    }

    let mut buckets: Vec<Vec<ImportStatement>> =
        (0..order.entries.len()).map(|_| Vec::new()).collect();
    for statement in statements {
        let index = order.assign(&statement)?;
        buckets[index].push(statement);
    }

    let mut out: Vec<OutputItem> = Vec::new();
    for (entry, mut bucket) in order.entries.iter().zip(buckets) {
        match entry {
            OrderEntry::Separator => {
                if out.last().is_some_and(|last| !last.is_separator()) {
                    out.push(OutputItem::Separator);
                }
            }
            OrderEntry::Group(group) => {
                if !bucket.is_empty() {
                    debug!(group = %group.raw, count = bucket.len(), "sorted import group");
                }
                bucket.sort_by(|a, b| compare_statements(a, b, options.case_sensitive));
                out.extend(bucket.into_iter().map(finish));
            }
        }
    }
    if out.last().is_some_and(OutputItem::is_separator) {
        out.pop();
    }
    Ok(out)
}

/// Natural order of module sources, ties by original position.
fn compare_statements(a: &ImportStatement, b: &ImportStatement, case_sensitive: bool) -> Ordering {
    natural_cmp(&a.source, &b.source, case_sensitive).then(a.order.cmp(&b.order))
}

/// Sort specifiers: default, namespace, then named (value before type, then
/// by local name).
pub fn sort_specifiers(statement: &mut ImportStatement, case_sensitive: bool) {
    statement.specifiers.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then(a.flavor.cmp(&b.flavor))
            .then_with(|| natural_cmp(&a.local, &b.local, case_sensitive))
    });
}
