// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Code generation for the arranged import block.
//!
//! Statements whose content is untouched are emitted as their original
//! source slice. Everything else is rebuilt from the model, keeping the
//! quote style, semicolon, brace padding and multi-line layout of the
//! statement that survived.

use crate::ast::{Comment, CommentArena, CommentKey, CommentKind, SpecifierKind};
use crate::comments::{AttachedComments, CommentPlan};
use crate::error::{SortError, SortResult};
use crate::model::{Flavor, ImportStatement, OutputItem, Specifier};

const DEFAULT_INDENT: &str = "  ";

/// Render `items` with the comments assigned by `plan`.
///
/// The result has no trailing line break; the caller decides whether one
/// follows the block.
pub fn render_block(
    items: &[OutputItem],
    plan: &CommentPlan,
    source: &str,
    arena: &CommentArena,
    newline: &str,
) -> SortResult<String> {
    let renderer = Renderer {
        plan,
        source,
        arena,
        newline,
    };

    let mut lines: Vec<String> = Vec::new();
    let header = renderer.comments(&plan.header)?;
    push_comment_lines(&mut lines, &header, source);
    if plan.header_break && !header.is_empty() {
        lines.push(String::new());
    }

    for item in items {
        match item {
            OutputItem::Separator => lines.push(String::new()),
            OutputItem::Statement(statement) => renderer.statement(statement, &mut lines)?,
        }
    }
    Ok(lines.join(newline))
}

/// Push comments on their own lines. A blank line or a shared line between
/// two comments survives only if they were neighbors in the source.
fn push_comment_lines(lines: &mut Vec<String>, comments: &[&Comment], source: &str) {
    let mut previous: Option<&Comment> = None;
    for comment in comments {
        let gap = previous.and_then(|prev| source.get(prev.span.end..comment.span.start));
        let adjacent = gap.is_some_and(|gap| gap.trim().is_empty());
        match lines.last_mut() {
            Some(last) if adjacent && gap.is_some_and(|gap| !gap.contains('\n')) => {
                last.push(' ');
                last.push_str(&comment.text);
            }
            _ => {
                if adjacent && gap.is_some_and(has_blank_line) {
                    lines.push(String::new());
                }
                lines.push(comment.text.clone());
            }
        }
        previous = Some(*comment);
    }
}

/// Whether whitespace `gap` spans an empty line.
fn has_blank_line(gap: &str) -> bool {
    gap.matches('\n').count() > 1
}

struct Renderer<'a> {
    plan: &'a CommentPlan,
    source: &'a str,
    arena: &'a CommentArena,
    newline: &'a str,
}

impl<'a> Renderer<'a> {
    fn comment(&self, key: &CommentKey) -> SortResult<&'a Comment> {
        self.arena.get(key).ok_or_else(|| {
            SortError::internal(format!("comment at offset {} is missing from the arena", key.start))
        })
    }

    fn comments(&self, keys: &[CommentKey]) -> SortResult<Vec<&'a Comment>> {
        keys.iter().map(|key| self.comment(key)).collect()
    }

    fn statement(&self, statement: &ImportStatement, lines: &mut Vec<String>) -> SortResult<()> {
        let empty = AttachedComments::default();
        let attached = self.plan.statement(&statement.key).unwrap_or(&empty);

        // Block comments on the statement's first line, before it, stay inline.
        let leading = self.comments(&attached.leading)?;
        let split = leading
            .iter()
            .rposition(|c| !(c.end_line == statement.start_line && c.span.end <= statement.span.start))
            .map_or(0, |index| index + 1);
        let (own_line, inline) = leading.split_at(split);

        push_comment_lines(lines, own_line, self.source);
        let start = inline.first().map_or(statement.span.start, |c| c.span.start);
        let gap = own_line
            .last()
            .and_then(|last| self.source.get(last.span.end..start));
        if gap.is_some_and(|gap| gap.trim().is_empty() && has_blank_line(gap)) {
            lines.push(String::new());
        }

        let clean = statement.is_clean();
        let mut text = String::new();
        for comment in inline {
            text.push_str(&comment.text);
            text.push(' ');
        }
        if clean {
            text.push_str(&self.source[statement.span.start..statement.span.end]);
        } else {
            text.push_str(&self.rebuild(statement, attached)?);
        }

        let mut after_line_comment = false;
        let mut cursor = statement.span.end;
        let mut pending_own_line: Vec<&Comment> = Vec::new();
        for comment in self.comments(&attached.trailing)? {
            if after_line_comment {
                pending_own_line.push(comment);
                continue;
            }
            text.push_str(self.gap(clean, cursor, comment.span.start));
            text.push_str(&comment.text);
            cursor = comment.span.end;
            after_line_comment = comment.kind() == CommentKind::Line;
        }
        lines.push(text);

        pending_own_line.extend(self.comments(&attached.trailing_own_line)?);
        push_comment_lines(lines, &pending_own_line, self.source);
        Ok(())
    }

    /// Horizontal space before a same-line trailing comment.
    fn gap(&self, clean: bool, from: usize, to: usize) -> &'a str {
        if clean && from < to {
            if let Some(gap) = self.source.get(from..to) {
                if gap.chars().all(|c| c == ' ' || c == '\t') {
                    return gap;
                }
            }
        }
        " "
    }

    fn rebuild(&self, statement: &ImportStatement, attached: &AttachedComments) -> SortResult<String> {
        let mut out = Tokens::new(self.newline);
        out.word("import");
        for comment in self.comments(&attached.inner)? {
            out.comment(comment);
        }
        if statement.flavor == Flavor::Type {
            out.word("type");
        }

        let quoted = format!(
            "{quote}{source}{quote}",
            quote = statement.quote.as_char(),
            source = statement.source
        );
        if statement.specifiers.is_empty() {
            out.word(&quoted);
        } else {
            let inline_type = statement.flavor != Flavor::Type;
            let mut clause: Vec<String> = statement
                .specifiers
                .iter()
                .filter(|spec| spec.kind != SpecifierKind::Named)
                .map(|spec| spec.render(inline_type))
                .collect();
            let named: Vec<&Specifier> = statement.named().collect();
            if !named.is_empty() {
                clause.push(self.braces(statement, &named, inline_type)?);
            }
            out.word(&clause.join(", "));
            out.word("from");
            out.word(&quoted);
        }

        let mut text = out.finish();
        if let Some(attributes) = &statement.attributes {
            text.push(' ');
            text.push_str(attributes);
        }
        if statement.has_semicolon {
            text.push(';');
        }
        Ok(text)
    }

    fn braces(
        &self,
        statement: &ImportStatement,
        named: &[&Specifier],
        inline_type: bool,
    ) -> SortResult<String> {
        let empty = AttachedComments::default();
        let mut entries = Vec::with_capacity(named.len());
        let mut multiline = statement.multiline;
        for spec in named {
            let attached = self.plan.specifier(&spec.key).unwrap_or(&empty);
            let leading = self.comments(&attached.leading)?;
            let trailing = self.comments(&attached.trailing)?;
            multiline |= !leading.is_empty()
                || trailing.iter().any(|c| c.kind() == CommentKind::Line);
            entries.push((spec.render(inline_type), leading, trailing));
        }

        if multiline {
            let indent = statement.indent.as_deref().unwrap_or(DEFAULT_INDENT);
            let mut lines = vec!["{".to_string()];
            for (text, leading, trailing) in entries {
                for comment in leading {
                    lines.push(format!("{indent}{}", comment.text));
                }
                let mut line = format!("{indent}{text},");
                for comment in trailing {
                    line.push(' ');
                    line.push_str(&comment.text);
                }
                lines.push(line);
            }
            lines.push("}".to_string());
            return Ok(lines.join(self.newline));
        }

        let pad = if statement.brace_padding { " " } else { "" };
        let items: Vec<String> = entries
            .into_iter()
            .map(|(mut text, _, trailing)| {
                for comment in trailing {
                    text.push(' ');
                    text.push_str(&comment.text);
                }
                text
            })
            .collect();
        Ok(format!("{{{pad}{}{pad}}}", items.join(", ")))
    }
}

/// Space-separated words where a line comment forces the next word onto a
/// new line.
struct Tokens<'a> {
    text: String,
    newline: &'a str,
    break_next: bool,
}

impl<'a> Tokens<'a> {
    fn new(newline: &'a str) -> Self {
        Tokens {
            text: String::new(),
            newline,
            break_next: false,
        }
    }

    fn separate(&mut self) {
        if self.break_next {
            self.text.push_str(self.newline);
            self.break_next = false;
        } else if !self.text.is_empty() {
            self.text.push(' ');
        }
    }

    fn word(&mut self, word: &str) {
        self.separate();
        self.text.push_str(word);
    }

    fn comment(&mut self, comment: &Comment) {
        self.word(&comment.text);
        self.break_next = comment.kind() == CommentKind::Line;
    }

    fn finish(self) -> String {
        self.text
    }
}
