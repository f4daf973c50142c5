// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Duplicate-source merging within a sortable chunk.
//!
//! The first statement for a module source is the keeper; later statements
//! for the same source fold into it when the merge is safe. A merge is
//! unsafe when:
//! - either side has a namespace specifier
//! - both sides have a default specifier
//! - either side is a type-only statement with a default specifier
//! - both sides bind the same local name
//! - the flavors differ and `combine_type_and_value` is off
//!
//! Side-effect statements and statements with import attributes never
//! merge.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::model::{Flavor, ImportStatement, SpecifierFlavor};
use crate::options::SortOptions;

/// Fold same-source statements of one sortable chunk.
pub fn merge_chunk(statements: Vec<ImportStatement>, options: &SortOptions) -> Vec<ImportStatement> {
    if !options.merge_duplicates {
        return statements;
    }

    let before = statements.len();
    let mut merged: Vec<ImportStatement> = Vec::with_capacity(before);
    let mut keepers: HashMap<String, Vec<usize>> = HashMap::new();

    for statement in statements {
        if !statement.flavor.is_mergeable() {
            merged.push(statement);
            continue;
        }

        let target = keepers.get(&statement.source).and_then(|candidates| {
            candidates
                .iter()
                .copied()
                .find(|&index| can_merge(&merged[index], &statement, options))
        });

        match target {
            Some(index) => {
                trace!(
                    source = %statement.source,
                    keeper = merged[index].span.start,
                    donor = statement.span.start,
                    "merging duplicate import"
                );
                absorb(&mut merged[index], statement);
            }
            None => {
                keepers
                    .entry(statement.source.clone())
                    .or_default()
                    .push(merged.len());
                merged.push(statement);
            }
        }
    }

    if merged.len() != before {
        debug!(before, after = merged.len(), "merged duplicate imports");
    }
    merged
}

/// Whether `donor` may be folded into `keeper`.
pub fn can_merge(keeper: &ImportStatement, donor: &ImportStatement, options: &SortOptions) -> bool {
    if keeper.source != donor.source || !keeper.flavor.is_mergeable() || !donor.flavor.is_mergeable() {
        return false;
    }
    if keeper.flavor != donor.flavor && !options.combine_type_and_value {
        return false;
    }
    if keeper.has_namespace() || donor.has_namespace() {
        return false;
    }
    if keeper.has_default() && donor.has_default() {
        return false;
    }
    let type_default =
        |stmt: &ImportStatement| stmt.flavor == Flavor::Type && stmt.has_default();
    if type_default(keeper) || type_default(donor) {
        return false;
    }
    !keeper
        .specifiers
        .iter()
        .any(|k| donor.specifiers.iter().any(|d| d.local == k.local))
}

/// Fold `donor` into `keeper`.
fn absorb(keeper: &mut ImportStatement, donor: ImportStatement) {
    if keeper.flavor != donor.flavor {
        // Mixed flavors become a value statement with inline type specifiers.
        keeper.flavor = Flavor::Value;
    }

    let ImportStatement {
        span,
        flavor: donor_flavor,
        mut specifiers,
        leading,
        trailing,
        inner,
        absorbed,
        ..
    } = donor;

    if donor_flavor == Flavor::Type {
        for spec in &mut specifiers {
            spec.flavor = SpecifierFlavor::Type;
        }
    }

    keeper.specifiers.append(&mut specifiers);
    keeper.leading.extend(leading);
    keeper.trailing.extend(trailing);
    keeper.inner.extend(inner);
    keeper.absorbed.push(span);
    keeper.absorbed.extend(absorbed);
    keeper.touched = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SpecifierKind;
    use crate::model::fixtures::stmt;
    use tugsort_core::range::Span;

    fn sources(statements: &[ImportStatement]) -> Vec<&str> {
        statements.iter().map(|s| s.source.as_str()).collect()
    }

    #[test]
    fn merges_same_source() {
        let statements = vec![
            stmt(0, "x", &["a"]),
            stmt(20, "y", &["b"]),
            stmt(40, "x", &["c"]),
        ];
        let merged = merge_chunk(statements, &SortOptions::default());
        assert_eq!(sources(&merged), vec!["x", "y"]);
        let locals: Vec<_> = merged[0].specifiers.iter().map(|s| s.local.as_str()).collect();
        assert_eq!(locals, vec!["a", "c"]);
        assert_eq!(merged[0].absorbed, vec![Span::new(40, 41)]);
        assert!(merged[0].touched);
        assert!(!merged[1].touched);
    }

    #[test]
    fn merge_disabled() {
        let statements = vec![stmt(0, "x", &["a"]), stmt(20, "x", &["b"])];
        let merged = merge_chunk(statements, &SortOptions::no_op());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn namespace_blocks_merge() {
        let mut ns = stmt(20, "x", &["ns"]);
        ns.specifiers[0].kind = SpecifierKind::Namespace;
        let merged = merge_chunk(vec![stmt(0, "x", &["a"]), ns], &SortOptions::default());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn two_defaults_block_merge() {
        let mut first = stmt(0, "x", &["A"]);
        first.specifiers[0].kind = SpecifierKind::Default;
        let mut second = stmt(20, "x", &["B"]);
        second.specifiers[0].kind = SpecifierKind::Default;
        let merged = merge_chunk(vec![first, second], &SortOptions::default());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn type_default_blocks_merge() {
        let mut typed = stmt(0, "x", &["T"]);
        typed.flavor = Flavor::Type;
        typed.specifiers[0].kind = SpecifierKind::Default;
        let merged = merge_chunk(vec![typed, stmt(20, "x", &["b"])], &SortOptions::default());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn duplicate_local_blocks_merge() {
        let merged = merge_chunk(
            vec![stmt(0, "x", &["a"]), stmt(20, "x", &["a"])],
            &SortOptions::default(),
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn cross_flavor_merge_tags_type_specifiers() {
        let mut typed = stmt(0, "x", &["A"]);
        typed.flavor = Flavor::Type;
        typed.specifiers[0].flavor = SpecifierFlavor::Type;
        let merged = merge_chunk(vec![typed, stmt(20, "x", &["B"])], &SortOptions::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].flavor, Flavor::Value);
        let flavors: Vec<_> = merged[0].specifiers.iter().map(|s| s.flavor).collect();
        assert_eq!(flavors, vec![SpecifierFlavor::Type, SpecifierFlavor::Value]);
    }

    #[test]
    fn cross_flavor_merge_needs_option() {
        let mut typed = stmt(20, "x", &["A"]);
        typed.flavor = Flavor::Type;
        let options = SortOptions {
            combine_type_and_value: false,
            ..SortOptions::default()
        };
        let merged = merge_chunk(vec![stmt(0, "x", &["B"]), typed], &options);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn later_keeper_can_accept() {
        // The first keeper refuses (both have defaults), the second accepts.
        let mut first = stmt(0, "x", &["D", "a"]);
        first.specifiers[0].kind = SpecifierKind::Default;
        let second = stmt(20, "x", &["a"]);
        let mut third = stmt(40, "x", &["F"]);
        third.specifiers[0].kind = SpecifierKind::Default;
        let merged = merge_chunk(vec![first, second, third], &SortOptions::default());
        assert_eq!(merged.len(), 2);
        let locals: Vec<_> = merged[1].specifiers.iter().map(|s| s.local.as_str()).collect();
        assert_eq!(locals, vec!["a", "F"]);
    }

    #[test]
    fn comments_concatenate_in_order() {
        use crate::ast::{CommentKey, CommentKind};
        let key = |start| CommentKey {
            start,
            kind: CommentKind::Line,
        };
        let mut keeper = stmt(10, "x", &["a"]);
        keeper.leading = vec![key(0)];
        let mut donor = stmt(30, "x", &["b"]);
        donor.leading = vec![key(25)];
        donor.trailing = vec![key(35)];
        let merged = merge_chunk(vec![keeper, donor], &SortOptions::default());
        assert_eq!(merged[0].leading, vec![key(0), key(25)]);
        assert_eq!(merged[0].trailing, vec![key(35)]);
    }

    #[test]
    fn side_effects_never_merge() {
        let merged = merge_chunk(
            vec![stmt(0, "x", &[]), stmt(20, "x", &[])],
            &SortOptions::default(),
        );
        assert_eq!(merged.len(), 2);
    }
}
