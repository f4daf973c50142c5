//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count bytes, not characters
//!
//! [`LineIndex`] precomputes line starts once so repeated lookups during
//! parsing are `O(log n)`.

/// Precomputed line start offsets for a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the index for `source`.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex {
            line_starts,
            len: source.len(),
        }
    }

    /// 1-indexed line containing the byte at `offset`.
    ///
    /// Offsets past the end report the last line.
    pub fn line_of(&self, offset: usize) -> u32 {
        let offset = offset.min(self.len);
        self.line_starts.partition_point(|&start| start <= offset) as u32
    }

    /// Convert a byte offset to 1-indexed line and column.
    pub fn position(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        let line_start = self.line_starts[(line - 1) as usize];
        (line, (offset - line_start) as u32 + 1)
    }

    /// Byte offset of the first character on a 1-indexed line.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get((line - 1) as usize).copied()
    }

    /// Number of lines, counting a final unterminated line.
    pub fn line_count(&self) -> u32 {
        match self.line_starts.last() {
            Some(&last) if last == self.len => (self.line_starts.len() - 1) as u32,
            _ => self.line_starts.len() as u32,
        }
    }
}

/// Line terminator used by `source`: `"\r\n"` if any CRLF occurs, else `"\n"`.
pub fn detect_newline(source: &str) -> &'static str {
    if source.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

// ============================================================================
// Tests
// ============================================================================
