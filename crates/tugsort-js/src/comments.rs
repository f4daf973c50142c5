// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Comment reattachment.
//!
//! After statements are merged, split and reordered, every comment the
//! parser attached to them must end up attached to exactly one owner in the
//! output. Ownership is recomputed into a fresh [`CommentPlan`]; the parsed
//! tree is never mutated.
//!
//! ## Passes
//!
//! 1. **Inner**: inner comments of statements and trailing comments of
//!    specifiers stay with their original owner.
//! 2. **Trailing**: a trailing comment on the owner's last line stays
//!    trailing. One on a later line that is also a leading comment of another
//!    live statement is left for that statement. Anything else is deferred as
//!    a [`ClaimClass::KeepNearOwner`] claim, rendered on its own line after
//!    the owner.
//! 3. **Leading**: comment blocks above the first import that end more than
//!    one line above it are deferred as [`ClaimClass::FileHeader`] claims. A
//!    block is never split between the header and the import.
//!    Leading comments of specifiers are deferred as
//!    [`ClaimClass::Specifier`] claims. Everything else attaches directly.
//!
//! Deferred claims are resolved in (class, encounter order); a claim for a
//! comment that already has an owner is dropped.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::ast::{Comment, CommentArena, CommentKey};
use crate::error::{SortError, SortResult};
use crate::model::{statements, ImportStatement, NodeKey, OutputItem};

// ============================================================================
// Types
// ============================================================================

/// Who a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The header slot above the first output statement.
    Header,
    Statement(NodeKey),
    Specifier(NodeKey),
}

/// Where a comment renders relative to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Leading,
    /// After the owner, on the same line.
    Trailing,
    /// After the owner, on a line of its own.
    TrailingOwnLine,
    Inner,
}

/// Priority of a deferred claim; lower variants resolve first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClaimClass {
    FileHeader,
    KeepNearOwner,
    Specifier,
}

/// Registry entry binding a comment to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentEntry {
    pub owner: Owner,
    pub association: Association,
    /// Set when the entry came from a deferred claim.
    pub class: Option<ClaimClass>,
}

/// Comments attached to one statement or specifier, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachedComments {
    pub leading: Vec<CommentKey>,
    pub trailing: Vec<CommentKey>,
    pub trailing_own_line: Vec<CommentKey>,
    pub inner: Vec<CommentKey>,
}

impl AttachedComments {
    fn push(&mut self, association: Association, key: CommentKey) {
        match association {
            Association::Leading => self.leading.push(key),
            Association::Trailing => self.trailing.push(key),
            Association::TrailingOwnLine => self.trailing_own_line.push(key),
            Association::Inner => self.inner.push(key),
        }
    }
}

/// Position of the first import in the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstImport {
    pub start: usize,
    pub line: u32,
}

impl FirstImport {
    pub fn of(statement: &ImportStatement) -> Self {
        FirstImport {
            start: statement.span.start,
            line: statement.start_line,
        }
    }

    /// Comments of `candidates` that belong to the file header.
    ///
    /// Comments above the first import form blocks separated by blank lines.
    /// Blocks above the one touching the import are header. The touching
    /// block is header as a whole when its first comment ends more than one
    /// line above the import, otherwise it leads the import. Comments on
    /// the import's own line always lead it.
    fn header_keys(&self, candidates: &[&Comment]) -> BTreeSet<CommentKey> {
        let above: Vec<&Comment> = candidates
            .iter()
            .copied()
            .filter(|comment| comment.span.end <= self.start && comment.end_line < self.line)
            .collect();

        let mut boundary = self.line;
        let mut touching = above.len();
        while touching > 0 && above[touching - 1].end_line + 1 >= boundary {
            touching -= 1;
            boundary = above[touching].start_line;
        }
        let whole_block = above
            .get(touching)
            .is_some_and(|comment| comment.end_line + 1 < self.line);
        let split = if whole_block { above.len() } else { touching };
        above[..split].iter().map(|comment| comment.key).collect()
    }
}

/// Result of reattachment.
#[derive(Debug, Clone, Default)]
pub struct CommentPlan {
    /// Every claimed comment.
    pub entries: BTreeMap<CommentKey, CommentEntry>,
    pub statements: HashMap<NodeKey, AttachedComments>,
    pub specifiers: HashMap<NodeKey, AttachedComments>,
    pub header: Vec<CommentKey>,
    /// A blank line followed the header in the original text.
    pub header_break: bool,
}

impl CommentPlan {
    pub fn statement(&self, key: &NodeKey) -> Option<&AttachedComments> {
        self.statements.get(key)
    }

    pub fn specifier(&self, key: &NodeKey) -> Option<&AttachedComments> {
        self.specifiers.get(key)
    }

    pub fn entry(&self, key: &CommentKey) -> Option<&CommentEntry> {
        self.entries.get(key)
    }

    /// Keys of every attached comment, in source order.
    pub fn keys(&self) -> impl Iterator<Item = &CommentKey> {
        self.entries.keys()
    }
}

// ============================================================================
// Reattachment
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Target {
    Header,
    Statement(NodeKey),
    /// Indexes into the live statement list and its specifiers.
    Specifier { statement: usize, specifier: usize },
}

#[derive(Debug)]
struct DeferredClaim {
    class: ClaimClass,
    encounter: usize,
    key: CommentKey,
    target: Target,
}

#[derive(Debug, Default)]
struct Registry {
    entries: BTreeMap<CommentKey, CommentEntry>,
}

impl Registry {
    /// First writer wins.
    fn claim(&mut self, key: CommentKey, entry: CommentEntry) -> bool {
        if self.entries.contains_key(&key) {
            trace!(offset = key.start, "comment already claimed");
            return false;
        }
        trace!(offset = key.start, owner = ?entry.owner, association = ?entry.association, "claimed comment");
        self.entries.insert(key, entry);
        true
    }

    fn contains(&self, key: &CommentKey) -> bool {
        self.entries.contains_key(key)
    }
}

fn lookup<'a>(arena: &'a CommentArena, key: &CommentKey) -> SortResult<&'a Comment> {
    arena.get(key).ok_or_else(|| {
        SortError::internal(format!("comment at offset {} is missing from the arena", key.start))
    })
}

/// Recompute comment ownership for the arranged output.
///
/// # Errors
///
/// `SortError::Internal` when there are comments but no output statements,
/// when statements carry comments but `first_import` is `None`, or when a
/// comment ends up without an owner.
pub fn reattach_comments(
    items: &[OutputItem],
    arena: &CommentArena,
    first_import: Option<FirstImport>,
) -> SortResult<CommentPlan> {
    let live: Vec<&ImportStatement> = statements(items).collect();
    if live.is_empty() {
        if arena.is_empty() {
            return Ok(CommentPlan::default());
        }
        return Err(SortError::internal(
            "comments present but there are no output statements",
        ));
    }

    let input: BTreeSet<CommentKey> = live
        .iter()
        .flat_map(|statement| statement.comment_keys().copied())
        .collect();
    let first = match first_import {
        Some(first) => first,
        None if input.is_empty() => FirstImport { start: 0, line: 0 },
        None => {
            return Err(SortError::internal(
                "statements carry comments but there is no first import",
            ))
        }
    };

    let mut leading: Vec<&Comment> = Vec::new();
    for statement in &live {
        for key in &statement.leading {
            leading.push(lookup(arena, key)?);
        }
    }
    leading.sort_by_key(|comment| comment.key);
    let header_keys = first.header_keys(&leading);

    let mut leading_owner: HashMap<CommentKey, NodeKey> = HashMap::new();
    for statement in &live {
        for key in &statement.leading {
            leading_owner.entry(*key).or_insert(statement.key);
        }
    }

    let mut registry = Registry::default();
    let mut deferred: Vec<DeferredClaim> = Vec::new();
    let mut defer = |class: ClaimClass, key: CommentKey, target: Target| {
        let encounter = deferred.len();
        trace!(offset = key.start, ?class, "deferred comment claim");
        deferred.push(DeferredClaim {
            class,
            encounter,
            key,
            target,
        });
    };

    // Pass 1: inner comments and specifier trailing comments.
    for statement in &live {
        for key in &statement.inner {
            registry.claim(
                *key,
                direct(Owner::Statement(statement.key), Association::Inner),
            );
        }
        for spec in &statement.specifiers {
            for key in &spec.trailing {
                registry.claim(*key, direct(Owner::Specifier(spec.key), Association::Trailing));
            }
        }
    }

    // Pass 2: statement trailing comments.
    for statement in &live {
        for key in &statement.trailing {
            let comment = lookup(arena, key)?;
            if comment.start_line == statement.end_line {
                registry.claim(
                    *key,
                    direct(Owner::Statement(statement.key), Association::Trailing),
                );
            } else if leading_owner
                .get(key)
                .is_some_and(|owner| *owner != statement.key)
            {
                trace!(offset = key.start, "trailing comment left for the next statement");
            } else {
                defer(ClaimClass::KeepNearOwner, *key, Target::Statement(statement.key));
            }
        }
    }

    // Pass 3: leading comments.
    for (index, statement) in live.iter().enumerate() {
        for key in &statement.leading {
            if header_keys.contains(key) {
                defer(ClaimClass::FileHeader, *key, Target::Header);
            } else {
                registry.claim(
                    *key,
                    direct(Owner::Statement(statement.key), Association::Leading),
                );
            }
        }
        for (spec_index, spec) in statement.specifiers.iter().enumerate() {
            for key in &spec.leading {
                defer(
                    ClaimClass::Specifier,
                    *key,
                    Target::Specifier {
                        statement: index,
                        specifier: spec_index,
                    },
                );
            }
        }
    }

    deferred.sort_by_key(|claim| (claim.class, claim.encounter));
    for claim in deferred {
        if registry.contains(&claim.key) {
            trace!(offset = claim.key.start, class = ?claim.class, "dropped deferred claim");
            continue;
        }
        let entry = match claim.target {
            Target::Header => CommentEntry {
                owner: Owner::Header,
                association: Association::Leading,
                class: Some(claim.class),
            },
            Target::Statement(key) => CommentEntry {
                owner: Owner::Statement(key),
                association: Association::TrailingOwnLine,
                class: Some(claim.class),
            },
            Target::Specifier {
                statement,
                specifier,
            } => resolve_specifier(live[statement], specifier, claim.class),
        };
        registry.claim(claim.key, entry);
    }

    if let Some(orphan) = input.iter().find(|key| !registry.contains(key)) {
        return Err(SortError::internal(format!(
            "comment at offset {} was not reattached",
            orphan.start
        )));
    }

    let mut plan = build_plan(registry);
    plan.header_break = match plan.header.last() {
        Some(key) => lookup(arena, key)?.end_line + 1 < first.line,
        None => false,
    };
    debug!(
        comments = plan.entries.len(),
        header = plan.header.len(),
        "reattached comments"
    );
    Ok(plan)
}

fn direct(owner: Owner, association: Association) -> CommentEntry {
    CommentEntry {
        owner,
        association,
        class: None,
    }
}

/// Leading comment of a specifier: stays leading if the specifier still
/// occupies its original slot among the specifiers that came from the same
/// statement, otherwise becomes a trailing comment of the specifier.
fn resolve_specifier(statement: &ImportStatement, index: usize, class: ClaimClass) -> CommentEntry {
    let owner = &statement.specifiers[index];
    let cohort: Vec<_> = statement
        .specifiers
        .iter()
        .filter(|spec| spec.origin == owner.origin)
        .collect();
    let mut slots: Vec<usize> = cohort.iter().map(|spec| spec.slot).collect();
    slots.sort_unstable();

    let occupant = slots
        .iter()
        .position(|&slot| slot == owner.slot)
        .and_then(|position| cohort.get(position));
    let association = if occupant.is_some_and(|spec| spec.key == owner.key) {
        Association::Leading
    } else {
        Association::Trailing
    };

    CommentEntry {
        owner: Owner::Specifier(owner.key),
        association,
        class: Some(class),
    }
}

fn build_plan(registry: Registry) -> CommentPlan {
    let mut plan = CommentPlan::default();
    for (key, entry) in &registry.entries {
        match entry.owner {
            Owner::Header => plan.header.push(*key),
            Owner::Statement(node) => plan
                .statements
                .entry(node)
                .or_default()
                .push(entry.association, *key),
            Owner::Specifier(node) => plan
                .specifiers
                .entry(node)
                .or_default()
                .push(entry.association, *key),
        }
    }
    plan.entries = registry.entries;
    plan
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ParseOptions, Program};
    use crate::extract::extract_imports;
    use crate::group::sort_specifiers;
    use crate::merge::merge_chunk;
    use crate::options::SortOptions;
    use crate::parser::parse;

    struct Fixture {
        program: Program,
        statements: Vec<ImportStatement>,
    }

    fn fixture(source: &str) -> Fixture {
        let program = parse(source, &ParseOptions::default()).unwrap();
        let statements = extract_imports(&program);
        Fixture {
            program,
            statements,
        }
    }

    impl Fixture {
        fn first(&self) -> Option<FirstImport> {
            self.statements.first().map(FirstImport::of)
        }

        /// Reattach for the statements rearranged by `order` (indexes).
        fn plan(&self, order: &[usize]) -> CommentPlan {
            let items: Vec<OutputItem> = order
                .iter()
                .map(|&i| OutputItem::Statement(self.statements[i].clone()))
                .collect();
            reattach_comments(&items, &self.program.comments, self.first()).unwrap()
        }

        fn key(&self, text: &str) -> CommentKey {
            self.program
                .comments
                .iter()
                .find(|c| c.text == text)
                .map(|c| c.key)
                .unwrap()
        }
    }

    mod statements_pass {
        use super::*;

        #[test]
        fn same_line_trailing_follows_owner() {
            let fx = fixture("import b from 'b'; // about b\nimport a from 'a';\n");
            let plan = fx.plan(&[1, 0]);
            let entry = plan.entry(&fx.key("// about b")).unwrap();
            assert_eq!(entry.owner, Owner::Statement(fx.statements[0].key));
            assert_eq!(entry.association, Association::Trailing);
        }

        #[test]
        fn own_line_comment_leads_next_statement() {
            let fx = fixture("import b from 'b';\n// about a\nimport a from 'a';\n");
            let plan = fx.plan(&[1, 0]);
            let entry = plan.entry(&fx.key("// about a")).unwrap();
            assert_eq!(entry.owner, Owner::Statement(fx.statements[1].key));
            assert_eq!(entry.association, Association::Leading);
            assert!(plan.header.is_empty());
            assert!(!plan.header_break);
        }

        #[test]
        fn header_comment_is_detached() {
            let fx = fixture("// license\n\n// about c\nimport c from 'c';\nimport a from 'a';\n");
            let plan = fx.plan(&[1, 0]);
            assert_eq!(plan.header, vec![fx.key("// license")]);
            assert!(plan.header_break);
            assert_eq!(
                plan.entry(&fx.key("// license")).unwrap().class,
                Some(ClaimClass::FileHeader)
            );
            let c = plan.statement(&fx.statements[0].key).unwrap();
            assert_eq!(c.leading, vec![fx.key("// about c")]);
        }

        #[test]
        fn adjacent_block_is_header_as_a_whole() {
            let fx = fixture("// one\n// two\nimport c from 'c';\nimport a from 'a';\n");
            let plan = fx.plan(&[1, 0]);
            assert_eq!(plan.header, vec![fx.key("// one"), fx.key("// two")]);
            assert!(!plan.header_break);
            assert!(plan.statement(&fx.statements[0].key).is_none());
        }

        #[test]
        fn header_keys_never_split_a_block() {
            let fx = fixture("// lic\n\n// one\n// two\n/* same */ import c from 'c';\n");
            let first = fx.first().unwrap();
            let leading: Vec<&Comment> = fx.program.comments.iter().collect();
            let keys: Vec<_> = first.header_keys(&leading).into_iter().collect();
            assert_eq!(keys, vec![fx.key("// lic"), fx.key("// one"), fx.key("// two")]);
        }

        #[test]
        fn single_adjacent_comment_leads() {
            let fx = fixture("// about c\nimport c from 'c';\nimport a from 'a';\n");
            let plan = fx.plan(&[1, 0]);
            assert!(plan.header.is_empty());
            let c = plan.statement(&fx.statements[0].key).unwrap();
            assert_eq!(c.leading, vec![fx.key("// about c")]);
        }

        #[test]
        fn inner_comments_stay() {
            let fx = fixture("import /* inner */ b from 'b';\nimport a from 'a';\n");
            let plan = fx.plan(&[1, 0]);
            let b = plan.statement(&fx.statements[0].key).unwrap();
            assert_eq!(b.inner, vec![fx.key("/* inner */")]);
        }

        #[test]
        fn trailing_without_later_owner_keeps_near_owner() {
            let mut fx = fixture("import b from 'b';\n// note\nimport a from 'a';\n");
            // Without a live statement claiming it as leading, the comment
            // stays with the statement it trailed.
            fx.statements[1].leading.clear();
            let plan = fx.plan(&[1, 0]);
            let entry = plan.entry(&fx.key("// note")).unwrap();
            assert_eq!(entry.owner, Owner::Statement(fx.statements[0].key));
            assert_eq!(entry.association, Association::TrailingOwnLine);
            assert_eq!(entry.class, Some(ClaimClass::KeepNearOwner));
        }
    }

    mod merged_statements {
        use super::*;

        #[test]
        fn donor_comments_follow_keeper() {
            let fx = fixture(
                "import { b } from 'x'; // b\nimport z from 'z';\n// about c\nimport { c } from 'x'; // c\n",
            );
            let merged = merge_chunk(fx.statements.clone(), &SortOptions::default());
            assert_eq!(merged.len(), 2);
            let items: Vec<_> = merged.into_iter().map(OutputItem::Statement).collect();
            let plan = reattach_comments(&items, &fx.program.comments, fx.first()).unwrap();

            let keeper = fx.statements[0].key;
            let about_c = plan.entry(&fx.key("// about c")).unwrap();
            // Trailing of `z`, leading of the donor (now the keeper).
            assert_eq!(about_c.owner, Owner::Statement(keeper));
            assert_eq!(about_c.association, Association::Leading);

            let c = plan.entry(&fx.key("// c")).unwrap();
            assert_eq!(c.owner, Owner::Statement(keeper));
            assert_eq!(c.association, Association::TrailingOwnLine);
            assert_eq!(plan.entries.len(), 3);
        }
    }

    mod specifiers {
        use super::*;

        const SOURCE: &str = "import {\n  // about b\n  b,\n  a, // about a\n} from 'x';\n";

        #[test]
        fn unmoved_specifier_keeps_leading() {
            let fx = fixture(SOURCE);
            let plan = fx.plan(&[0]);
            let b = fx.statements[0].specifiers[0].key;
            let entry = plan.entry(&fx.key("// about b")).unwrap();
            assert_eq!(entry.owner, Owner::Specifier(b));
            assert_eq!(entry.association, Association::Leading);
            assert_eq!(entry.class, Some(ClaimClass::Specifier));
        }

        #[test]
        fn moved_specifier_downgrades_to_trailing() {
            let fx = fixture(SOURCE);
            let mut statement = fx.statements[0].clone();
            sort_specifiers(&mut statement, false);
            let b = fx.statements[0].specifiers[0].key;
            let items = vec![OutputItem::Statement(statement)];
            let plan = reattach_comments(&items, &fx.program.comments, fx.first()).unwrap();

            let entry = plan.entry(&fx.key("// about b")).unwrap();
            assert_eq!(entry.owner, Owner::Specifier(b));
            assert_eq!(entry.association, Association::Trailing);

            let a = fx.statements[0].specifiers[1].key;
            assert_eq!(
                plan.specifier(&a).unwrap().trailing,
                vec![fx.key("// about a")]
            );
        }
    }

    mod contract {
        use super::*;

        #[test]
        fn no_statements_with_comments_is_internal() {
            let fx = fixture("// lonely\nimport a from 'a';\n");
            let err = reattach_comments(&[], &fx.program.comments, fx.first()).unwrap_err();
            assert!(matches!(err, SortError::Internal { .. }));
        }

        #[test]
        fn missing_first_import_is_internal() {
            let fx = fixture("// about a\nimport a from 'a';\n");
            let items = vec![OutputItem::Statement(fx.statements[0].clone())];
            let err = reattach_comments(&items, &fx.program.comments, None).unwrap_err();
            assert!(matches!(err, SortError::Internal { .. }));
        }

        #[test]
        fn every_comment_is_claimed_once() {
            let fx = fixture(
                "// header\n\n// lead b\nimport { y, /* x */ x } from 'b'; // tb\n// lead a\nimport a from 'a';\n",
            );
            let plan = fx.plan(&[1, 0]);
            let attached: BTreeSet<_> = fx
                .statements
                .iter()
                .flat_map(|s| s.comment_keys().copied())
                .collect();
            let claimed: BTreeSet<_> = plan.keys().copied().collect();
            assert_eq!(attached, claimed);
        }
    }
}
