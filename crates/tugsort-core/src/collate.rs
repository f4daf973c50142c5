//! Natural string collation.
//!
//! Embedded digit runs compare by numeric value (`file2` < `file10`), letters
//! compare case-insensitively, and characters are weighted by class so that
//! punctuation sorts before digits and digits before letters, independent of
//! where ASCII happens to place them.
//!
//! With `case_sensitive`, letters compare by code point instead, so the first
//! differing character decides and uppercase sorts before lowercase
//! (`ExampleWidget` < `ExamplesList`). Strings that compare equal return
//! `Ordering::Equal`; callers rely on stable sorts to keep the original order
//! for ties.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings by natural collation.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use tugsort_core::collate::natural_cmp;
///
/// assert_eq!(natural_cmp("file2", "file10", false), Ordering::Less);
/// assert_eq!(natural_cmp("React", "react", false), Ordering::Equal);
/// assert_eq!(natural_cmp("React", "react", true), Ordering::Less);
/// ```
pub fn natural_cmp(a: &str, b: &str, case_sensitive: bool) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let x_run = take_digits(&mut left);
                    let y_run = take_digits(&mut right);
                    let ord = compare_numeric(&x_run, &y_run);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                } else {
                    let ord = char_weight(x, case_sensitive).cmp(&char_weight(y, case_sensitive));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    left.next();
                    right.next();
                }
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Compare digit runs by value, then by run length (`01` after `1`).
fn compare_numeric(x: &str, y: &str) -> Ordering {
    let x_trimmed = x.trim_start_matches('0');
    let y_trimmed = y.trim_start_matches('0');
    x_trimmed
        .len()
        .cmp(&y_trimmed.len())
        .then_with(|| x_trimmed.cmp(y_trimmed))
        .then_with(|| x.len().cmp(&y.len()))
}

/// Class-then-character weight: punctuation < digits < letters.
fn char_weight(c: char, case_sensitive: bool) -> (u8, char) {
    let class = if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    };
    if case_sensitive {
        (class, c)
    } else {
        (class, c.to_lowercase().next().unwrap_or(c))
    }
}

// ============================================================================
// Tests
// ============================================================================
