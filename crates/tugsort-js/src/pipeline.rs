// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Sorting front door.
//!
//! ```text
//! parse -> extract -> classify -> merge -> explode -> group & sort
//!       -> reattach comments -> render -> splice
//! ```
//!
//! Imports separated by a `declare module` block form independent regions;
//! no statement moves across one. Every failure leaves the text untouched.

use tracing::{debug, warn};
use tugsort_core::range::{merge_spans, widen_to_lines, Span, Splice};
use tugsort_core::text::detect_newline;

use crate::ast::{Item, ParseOptions, Program};
use crate::classify::{classify, ChunkKind};
use crate::comments::{reattach_comments, FirstImport};
use crate::error::{SortError, SortResult};
use crate::explode::explode_type_specifiers;
use crate::extract::extract_imports;
use crate::group::{assign_and_sort, ImportOrder};
use crate::merge::merge_chunk;
use crate::model::{normalize_separators, statements, ImportStatement, OutputItem};
use crate::options::{SortOptions, IGNORE_FILE_MARKER};
use crate::parser::parse;
use crate::render::render_block;

/// Result of sorting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub text: String,
    /// `text` differs from the input.
    pub changed: bool,
    /// The file carries the ignore-file marker and was not looked at.
    pub skipped: bool,
}

impl SortOutcome {
    fn unchanged(source: &str) -> Self {
        SortOutcome {
            text: source.to_string(),
            changed: false,
            skipped: false,
        }
    }
}

/// Sort the imports of `source`.
///
/// # Errors
///
/// - `SortError::InvalidPattern` for a pattern that is not a valid regex
/// - `SortError::Parse` if the import region cannot be parsed
/// - `SortError::UnmatchedGroup` if an import fits no group of the order
/// - `SortError::Internal` if the engine loses track of a comment
pub fn sort_imports(source: &str, options: &SortOptions) -> SortResult<SortOutcome> {
    options.validate()?;
    let order = ImportOrder::parse(&options.normalized_order())?;
    let program = parse(
        source,
        &ParseOptions {
            dialect: options.dialect,
        },
    )?;

    if program
        .comments
        .iter()
        .any(|comment| comment.body() == IGNORE_FILE_MARKER)
    {
        debug!("file opted out of import sorting");
        return Ok(SortOutcome {
            skipped: true,
            ..SortOutcome::unchanged(source)
        });
    }

    let newline = detect_newline(source);
    let mut edits = Vec::new();
    for region in regions(&program) {
        if let Some(edit) = sort_region(region, &program, source, &order, options, newline)? {
            edits.push(edit);
        }
    }
    if edits.is_empty() {
        debug!("nothing to sort");
        return Ok(SortOutcome::unchanged(source));
    }

    // Later regions first, so earlier offsets stay valid.
    let mut text = source.to_string();
    for edit in edits.into_iter().rev() {
        text = edit.apply(&text)?;
    }
    let changed = text != source;
    debug!(changed, "sorted imports");
    Ok(SortOutcome {
        text,
        changed,
        skipped: false,
    })
}

/// Like [`sort_imports`], but any error yields the original text.
pub fn sort_imports_or_original(source: &str, options: &SortOptions) -> SortOutcome {
    match sort_imports(source, options) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(error = %err, "import sorting failed; leaving text unchanged");
            SortOutcome::unchanged(source)
        }
    }
}

/// Top-level imports grouped by the ambient blocks between them.
fn regions(program: &Program) -> Vec<Vec<ImportStatement>> {
    let boundaries: Vec<usize> = program
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Ambient { span, .. } => Some(span.start),
            _ => None,
        })
        .collect();

    let mut regions: Vec<Vec<ImportStatement>> = vec![Vec::new(); boundaries.len() + 1];
    for statement in extract_imports(program) {
        let index = boundaries.partition_point(|&start| start < statement.span.start);
        regions[index].push(statement);
    }
    regions.retain(|region| !region.is_empty());
    regions
}

/// Replacement of one region's statements by a rendered block.
#[derive(Debug)]
struct RegionEdit {
    deletions: Vec<Span>,
    block: String,
}

impl RegionEdit {
    fn apply(self, text: &str) -> SortResult<String> {
        let mut splice = Splice::new(text);
        splice.delete_all(self.deletions);
        splice.insert(self.block);
        splice
            .apply()
            .map_err(|err| SortError::internal(format!("failed to splice import block: {err}")))
    }
}

fn sort_region(
    region: Vec<ImportStatement>,
    program: &Program,
    source: &str,
    order: &ImportOrder,
    options: &SortOptions,
    newline: &str,
) -> SortResult<Option<RegionEdit>> {
    let Some(first) = region.first().map(FirstImport::of) else {
        return Ok(None);
    };

    let chunks = classify(region, options, &program.comments);
    if chunks.iter().all(|chunk| chunk.kind == ChunkKind::Unsortable) {
        return Ok(None);
    }

    let mut items: Vec<OutputItem> = Vec::new();
    let mut previous_end: Option<usize> = None;
    for chunk in chunks {
        let bounds = chunk
            .statements
            .first()
            .zip(chunk.statements.last())
            .map(|(first, last)| (first.span.start, last.span.end));
        if let (Some(end), Some((start, _))) = (previous_end, bounds) {
            if has_blank_line(source, end, start) {
                items.push(OutputItem::Separator);
            }
        }
        previous_end = bounds.map(|(_, end)| end);

        match chunk.kind {
            ChunkKind::Unsortable => {
                let mut last_end: Option<usize> = None;
                for statement in chunk.statements {
                    if last_end.is_some_and(|end| has_blank_line(source, end, statement.span.start)) {
                        items.push(OutputItem::Separator);
                    }
                    last_end = Some(statement.span.end);
                    items.push(OutputItem::Statement(statement));
                }
            }
            ChunkKind::Sortable => {
                let mut merged = merge_chunk(chunk.statements, options);
                if order.has_type_scopes() {
                    merged = explode_type_specifiers(merged);
                }
                items.extend(assign_and_sort(merged, order, options)?);
            }
        }
    }
    normalize_separators(&mut items);

    if order.is_empty() && is_identity(&items) {
        debug!("import order disabled and nothing changed");
        return Ok(None);
    }

    let plan = reattach_comments(&items, &program.comments, Some(first))?;
    let mut block = render_block(&items, &plan, source, &program.comments, newline)?;

    let mut deletions: Vec<Span> = statements(&items)
        .flat_map(|statement| statement.original_spans())
        .collect();
    for key in plan.keys() {
        let comment = program.comments.get(key).ok_or_else(|| {
            SortError::internal(format!("comment at offset {} is missing from the arena", key.start))
        })?;
        deletions.push(comment.span);
    }
    let deletions: Vec<Span> = deletions
        .into_iter()
        .map(|span| widen_to_lines(span, source))
        .collect();

    let ends_with_newline = merge_spans(deletions.iter().copied(), source)
        .last()
        .and_then(|span| source.get(..span.end))
        .is_some_and(|text| text.ends_with('\n'));
    if ends_with_newline {
        block.push_str(newline);
    }

    debug!(
        statements = statements(&items).count(),
        comments = plan.entries.len(),
        "rendered import block"
    );
    Ok(Some(RegionEdit { deletions, block }))
}

/// Statements in original order, each emitted as its original text.
fn is_identity(items: &[OutputItem]) -> bool {
    let mut previous: Option<usize> = None;
    statements(items).all(|statement| {
        let in_order = previous.is_none_or(|order| order < statement.order);
        previous = Some(statement.order);
        in_order && statement.is_clean()
    })
}

/// Whether the text between `start` and `end` contains an empty line.
fn has_blank_line(source: &str, start: usize, end: usize) -> bool {
    let Some(gap) = source.get(start..end) else {
        return false;
    };
    let lines: Vec<&str> = gap.split('\n').collect();
    lines.len() > 2
        && lines[1..lines.len() - 1]
            .iter()
            .any(|line| line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(source: &str) -> String {
        sort_imports(source, &SortOptions::default()).unwrap().text
    }

    mod regions {
        use super::*;

        #[test]
        fn ambient_block_is_a_barrier() {
            let source = "import b from 'b';\ndeclare module 'm' {\n  import x from 'x';\n}\nimport a from 'a';\nimport c from 'c';\n";
            let program = parse(source, &ParseOptions::default()).unwrap();
            let regions = regions(&program);
            assert_eq!(regions.len(), 2);
            assert_eq!(sorted(source), source);
        }

        #[test]
        fn each_region_sorts_independently() {
            let source = "import z from 'z';\nimport y from 'y';\ndeclare module 'm';\nimport c from 'c';\nimport a from 'a';\n";
            assert_eq!(
                sorted(source),
                "import y from 'y';\nimport z from 'z';\ndeclare module 'm';\nimport a from 'a';\nimport c from 'c';\n"
            );
        }
    }

    mod gaps {
        use super::*;

        #[test]
        fn blank_line_detection() {
            let text = "a;\n\nb;";
            assert!(has_blank_line(text, 2, 5));
            assert!(!has_blank_line("a;\nb;", 2, 3));
            assert!(has_blank_line("a;\n  \n// c\nb;", 2, 10));
            assert!(!has_blank_line("a; // c\nb;", 2, 8));
        }
    }

    mod outcomes {
        use super::*;

        #[test]
        fn no_imports_is_unchanged() {
            let source = "const a = 1;\n";
            let outcome = sort_imports(source, &SortOptions::default()).unwrap();
            assert_eq!(outcome.text, source);
            assert!(!outcome.changed);
        }

        #[test]
        fn ignore_file_marker() {
            let source = "// tugsort-ignore-file\nimport b from 'b';\nimport a from 'a';\n";
            let outcome = sort_imports(source, &SortOptions::default()).unwrap();
            assert_eq!(outcome.text, source);
            assert!(outcome.skipped);
        }

        #[test]
        fn crlf_is_preserved() {
            let source = "import b from 'b';\r\nimport a from 'a';\r\n\r\nrun();\r\n";
            assert_eq!(
                sorted(source),
                "import a from 'a';\r\nimport b from 'b';\r\n\r\nrun();\r\n"
            );
        }

        #[test]
        fn code_after_imports_is_kept() {
            let source = "import b from 'b';\nimport a from 'a';\n\nexport const x = a + b;\n";
            let outcome = sort_imports(source, &SortOptions::default()).unwrap();
            assert!(outcome.changed);
            assert_eq!(
                outcome.text,
                "import a from 'a';\nimport b from 'b';\n\nexport const x = a + b;\n"
            );
        }

        #[test]
        fn unmatched_group_fails_and_fallback_keeps_text() {
            let options = SortOptions {
                import_order: vec!["<THIRD_PARTY_MODULES>".to_string(), "<TYPES>^x$".to_string()],
                ..SortOptions::default()
            };
            let source = "import type {T} from 'y';\nimport a from 'a';\n";
            let err = sort_imports(source, &options).unwrap_err();
            assert!(matches!(err, SortError::UnmatchedGroup { line: 1, .. }));
            assert_eq!(sort_imports_or_original(source, &options).text, source);
        }

        #[test]
        fn parse_error_propagates() {
            let err = sort_imports("import {a from 'a';\n", &SortOptions::default()).unwrap_err();
            assert!(matches!(err, SortError::Parse { line: 1, .. }));
        }

        #[test]
        fn invalid_side_effect_pattern() {
            let options = SortOptions {
                side_effect_sortable: vec!["(".to_string()],
                ..SortOptions::default()
            };
            let err = sort_imports("import a from 'a';\n", &options).unwrap_err();
            assert!(matches!(err, SortError::InvalidPattern { .. }));
        }
    }
}
