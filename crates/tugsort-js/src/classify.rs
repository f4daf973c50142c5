// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Chunk classification: which statements may move.
//!
//! A statement is unsortable when it is a side-effect import (unless its
//! source matches a `side_effect_sortable` pattern) or when the comment
//! directly above it is a skip marker. Maximal runs of equally classified
//! statements form chunks; statements never cross a chunk boundary.

use tracing::debug;

use crate::ast::CommentArena;
use crate::model::ImportStatement;
use crate::options::SortOptions;
use crate::patterns;

/// Whether the statements of a chunk may be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Sortable,
    Unsortable,
}

/// A maximal run of statements with the same [`ChunkKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub statements: Vec<ImportStatement>,
}

/// Split `statements` into alternating sortable and unsortable chunks.
pub fn classify(
    statements: Vec<ImportStatement>,
    options: &SortOptions,
    comments: &CommentArena,
) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut previous_end_line: Option<u32> = None;

    for statement in statements {
        let kind = if is_unsortable(&statement, previous_end_line, options, comments) {
            ChunkKind::Unsortable
        } else {
            ChunkKind::Sortable
        };
        previous_end_line = Some(statement.end_line);

        match chunks.last_mut() {
            Some(chunk) if chunk.kind == kind => chunk.statements.push(statement),
            _ => chunks.push(Chunk {
                kind,
                statements: vec![statement],
            }),
        }
    }

    debug!(
        chunks = chunks.len(),
        sortable = chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Sortable)
            .count(),
        "classified import chunks"
    );
    chunks
}

fn is_unsortable(
    statement: &ImportStatement,
    previous_end_line: Option<u32>,
    options: &SortOptions,
    comments: &CommentArena,
) -> bool {
    if statement.is_side_effect()
        && !options
            .side_effect_sortable
            .iter()
            .any(|pattern| patterns::is_match(pattern, &statement.source))
    {
        return true;
    }
    has_skip_marker(statement, previous_end_line, options, comments)
}

/// The last leading comment, if it starts below the previous statement,
/// is a skip marker.
fn has_skip_marker(
    statement: &ImportStatement,
    previous_end_line: Option<u32>,
    options: &SortOptions,
    comments: &CommentArena,
) -> bool {
    let Some(comment) = statement.leading.last().and_then(|key| comments.get(key)) else {
        return false;
    };
    if previous_end_line.is_some_and(|line| comment.start_line <= line) {
        return false;
    }
    let body = comment.body();
    options.skip_markers.iter().any(|marker| marker == body)
}
