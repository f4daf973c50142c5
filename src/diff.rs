//! Unified diff generation.
//!
//! Produces standard unified diff text (three lines of context) between the
//! original and sorted contents of a file.

const CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

/// One line of the edit script, with its position in both texts.
#[derive(Debug, Clone, Copy)]
struct DiffLine<'a> {
    op: Op,
    text: &'a str,
    /// Index of this line (or of the next line, for insertions) in the old text.
    old: usize,
    /// Index of this line (or of the next line, for deletions) in the new text.
    new: usize,
}

/// Generate a unified diff for one file. Returns an empty string when the
/// texts have the same lines.
pub fn unified_diff(path: &str, old: &str, new: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let script = diff_lines(&old_lines, &new_lines);

    let hunks = hunk_ranges(&script);
    if hunks.is_empty() {
        return String::new();
    }

    let mut diff = String::new();
    diff.push_str(&format!("--- a/{}\n", path));
    diff.push_str(&format!("+++ b/{}\n", path));
    for (start, end) in hunks {
        let lines = &script[start..end];
        let old_count = lines.iter().filter(|l| l.op != Op::Insert).count();
        let new_count = lines.iter().filter(|l| l.op != Op::Delete).count();
        let old_start = lines[0].old + usize::from(old_count > 0);
        let new_start = lines[0].new + usize::from(new_count > 0);
        diff.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old_start, old_count, new_start, new_count
        ));
        for line in lines {
            let marker = match line.op {
                Op::Equal => ' ',
                Op::Delete => '-',
                Op::Insert => '+',
            };
            diff.push(marker);
            diff.push_str(line.text);
            diff.push('\n');
        }
    }
    diff
}

/// Line edit script: common prefix and suffix, LCS in between.
fn diff_lines<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<DiffLine<'a>> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];

    // lcs[i][j]: length of the longest common subsequence of a[i..] and b[j..]
    let mut lcs = vec![vec![0u32; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut script = Vec::with_capacity(old.len().max(new.len()));
    let equal = |text, old, new| DiffLine {
        op: Op::Equal,
        text,
        old,
        new,
    };
    for (k, text) in old.iter().enumerate().take(prefix) {
        script.push(equal(*text, k, k));
    }

    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let (old_index, new_index) = (prefix + i, prefix + j);
        if i < a.len() && j < b.len() && a[i] == b[j] {
            script.push(equal(a[i], old_index, new_index));
            i += 1;
            j += 1;
        } else if i < a.len() && (j == b.len() || lcs[i + 1][j] >= lcs[i][j + 1]) {
            script.push(DiffLine {
                op: Op::Delete,
                text: a[i],
                old: old_index,
                new: new_index,
            });
            i += 1;
        } else {
            script.push(DiffLine {
                op: Op::Insert,
                text: b[j],
                old: old_index,
                new: new_index,
            });
            j += 1;
        }
    }

    let (old_tail, new_tail) = (old.len() - suffix, new.len() - suffix);
    for (offset, text) in old[old_tail..].iter().enumerate() {
        script.push(equal(*text, old_tail + offset, new_tail + offset));
    }
    script
}

/// Script ranges to print, each change padded with context and nearby
/// ranges joined.
fn hunk_ranges(script: &[DiffLine<'_>]) -> Vec<(usize, usize)> {
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for (index, line) in script.iter().enumerate() {
        if line.op == Op::Equal {
            continue;
        }
        let start = index.saturating_sub(CONTEXT);
        let end = (index + CONTEXT + 1).min(script.len());
        match hunks.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => hunks.push((start, end)),
        }
    }
    hunks
}

// ============================================================================
// Tests
// ============================================================================
