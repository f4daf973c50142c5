//! Byte spans and range reconciliation for splicing a rewritten region.
//!
//! This module implements the text surgery used when a block of statements is
//! regenerated:
//! - Half-open byte spans over the original text
//! - Widening spans to whole lines when they occupy whole lines
//! - Merging overlapping, touching, or whitespace-separated spans
//! - Computing the kept complement and stitching in generated text
//!
//! ## Splice Semantics
//!
//! A [`Splice`] collects deletions and at most one insertion. On apply, the
//! deletions are merged into disjoint spans, the complement of the merged
//! spans is kept verbatim, and the insertion is placed where the first merged
//! span began. Text outside the deleted spans is never touched.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span overlaps or is adjacent to another.
    pub fn touches(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both spans.
    pub fn cover(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Range Arithmetic
// ============================================================================

/// Widen a span to whole lines when it occupies whole lines.
///
/// The start moves back over spaces and tabs if only indentation precedes it
/// on its line. The end moves forward over spaces and tabs plus one line
/// break if nothing else follows it on its line. Either side stays put when
/// other text shares the line.
pub fn widen_to_lines(span: Span, source: &str) -> Span {
    let bytes = source.as_bytes();
    let end_limit = span.end.min(bytes.len());

    let mut start = span.start.min(end_limit);
    while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    if start != 0 && bytes[start - 1] != b'\n' {
        start = span.start.min(end_limit);
    }

    let mut end = end_limit;
    while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
        end += 1;
    }
    if end < bytes.len() {
        if bytes[end] == b'\n' {
            end += 1;
        } else if bytes[end] == b'\r' && bytes.get(end + 1) == Some(&b'\n') {
            end += 2;
        } else {
            end = end_limit;
        }
    }

    Span::new(start, end)
}

/// Sort spans by start offset and merge any that overlap, touch, or are
/// separated only by whitespace in `source`.
///
/// The result is sorted and pairwise disjoint.
pub fn merge_spans(spans: impl IntoIterator<Item = Span>, source: &str) -> Vec<Span> {
    let mut sorted: Vec<Span> = spans.into_iter().collect();
    sorted.sort_by_key(|span| (span.start, span.end));

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        if let Some(last) = merged.last_mut() {
            let bridged = span.start <= last.end
                || source
                    .get(last.end..span.start)
                    .is_some_and(|gap| gap.trim().is_empty());
            if bridged {
                last.end = last.end.max(span.end);
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

/// Complement of sorted, disjoint spans with respect to `[0, len)`.
///
/// Empty gaps are omitted.
pub fn complement_spans(merged: &[Span], len: usize) -> Vec<Span> {
    let mut kept = Vec::with_capacity(merged.len() + 1);
    let mut cursor = 0usize;
    for span in merged {
        if span.start > cursor {
            kept.push(Span::new(cursor, span.start));
        }
        cursor = cursor.max(span.end);
    }
    if cursor < len {
        kept.push(Span::new(cursor, len));
    }
    kept
}

// ============================================================================
// Splice
// ============================================================================

/// Error type for splice operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    /// A deletion extends beyond the source.
    #[error("span {span} is out of bounds for source of length {source_len}")]
    SpanOutOfBounds { span: Span, source_len: usize },

    /// A deletion boundary splits a UTF-8 character.
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// Text was queued for insertion but no deletion anchors it.
    #[error("insertion has no anchoring deletion")]
    NoAnchor,
}

/// A one-shot splice: delete ranges, insert a block where they began.
///
/// # Example
///
/// ```
/// use tugsort_core::range::{Span, Splice};
///
/// let source = "b;\na;\nrest\n";
/// let mut splice = Splice::new(source);
/// splice.delete(Span::new(0, 3));
/// splice.delete(Span::new(3, 6));
/// splice.insert("a;\nb;\n");
/// assert_eq!(splice.apply().unwrap(), "a;\nb;\nrest\n");
/// ```
pub struct Splice<'src> {
    source: &'src str,
    deletions: Vec<Span>,
    insertion: Option<String>,
}

impl<'src> Splice<'src> {
    /// Create a new splice over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            deletions: Vec::new(),
            insertion: None,
        }
    }

    /// Queue a range for deletion.
    pub fn delete(&mut self, span: Span) {
        self.deletions.push(span);
    }

    /// Queue several ranges for deletion.
    pub fn delete_all(&mut self, spans: impl IntoIterator<Item = Span>) {
        self.deletions.extend(spans);
    }

    /// Set the text inserted at the start of the first merged deletion.
    pub fn insert(&mut self, text: impl Into<String>) {
        self.insertion = Some(text.into());
    }

    /// Returns the merged deletion spans.
    pub fn merged(&self) -> Vec<Span> {
        merge_spans(self.deletions.iter().copied(), self.source)
    }

    /// Apply the splice and return the new text.
    ///
    /// # Errors
    ///
    /// - `SpliceError::SpanOutOfBounds` if any span exceeds the source
    /// - `SpliceError::NotCharBoundary` if a span splits a character
    /// - `SpliceError::NoAnchor` if there is an insertion but no deletion
    pub fn apply(self) -> Result<String, SpliceError> {
        let source_len = self.source.len();
        for span in &self.deletions {
            if span.end > source_len {
                return Err(SpliceError::SpanOutOfBounds {
                    span: *span,
                    source_len,
                });
            }
            for offset in [span.start, span.end] {
                if !self.source.is_char_boundary(offset) {
                    return Err(SpliceError::NotCharBoundary { offset });
                }
            }
        }

        let merged = self.merged();
        let Some(anchor) = merged.first().map(|span| span.start) else {
            return match self.insertion {
                Some(_) => Err(SpliceError::NoAnchor),
                None => Ok(self.source.to_string()),
            };
        };

        let insertion = self.insertion.unwrap_or_default();
        let mut out = String::with_capacity(source_len + insertion.len());
        let mut inserted = false;
        for span in complement_spans(&merged, source_len) {
            if !inserted && span.start >= anchor {
                out.push_str(&insertion);
                inserted = true;
            }
            out.push_str(&self.source[span.start..span.end]);
        }
        if !inserted {
            out.push_str(&insertion);
        }
        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================
