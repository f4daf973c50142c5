// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Import-region parser.
//!
//! Parses the leading part of a module into a [`Program`]:
//!
//! ```text
//! <program>   := [<hashbang>] <directive>* (<import> | <ambient>)* [<code>]
//! <import>    := "import" ["type"] (<string> | <clause> "from" <string>)
//!                [("with" | "assert") <braces>] [";"]
//! <clause>    := <ident> ["," (<namespace> | <named>)] | <namespace> | <named>
//! <namespace> := "*" "as" <ident>
//! <named>     := "{" (<specifier> ",")* [<specifier>] "}"
//! <specifier> := ["type"] (<ident> | <string>) ["as" <ident>]
//! <ambient>   := "declare" "module" <string> (<braces> | ";")
//! ```
//!
//! Token-level parsers use `winnow`; a cursor over the remaining input tracks
//! byte offsets and collects comments into the [`CommentArena`] as trivia is
//! skipped.
//!
//! ## Comment attachment
//!
//! - Comments between two imports are trailing comments of the first and
//!   leading comments of the second.
//! - After the last import, only comments on its final line are attached.
//! - Comments before or among directives are not attached.
//! - Inside braces, a comment on a specifier's final line trails it; any
//!   other comment leads the next specifier (or trails the last one).
//! - Remaining comments inside a declaration are inner comments.

use thiserror::Error;
use tugsort_core::range::Span;
use tugsort_core::text::LineIndex;
use winnow::combinator::{alt, delimited};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_until, take_while};
use winnow::ModalResult;

use crate::ast::{
    Comment, CommentArena, CommentKey, CommentKind, Dialect, ImportDecl, ImportKind,
    ImportSpecifier, Item, ParseOptions, Program, Quote, SpecifierKind,
};

/// Error produced when an `import` keyword does not start a valid declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-indexed line where parsing stopped.
    pub line: u32,
    pub message: String,
}

/// Parse the import region of `source`.
///
/// # Example
///
/// ```
/// use tugsort_js::ast::{Item, ParseOptions};
/// use tugsort_js::parser::parse;
///
/// let program = parse("import b from 'b';\nrun();\n", &ParseOptions::default()).unwrap();
/// assert_eq!(program.imports().count(), 1);
/// assert!(matches!(program.items.last(), Some(Item::Code { .. })));
/// ```
pub fn parse(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    Cursor::new(source, options.dialect).program()
}

// ============================================================================
// Token parsers
// ============================================================================

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (one_of(is_ident_start), take_while(0.., is_ident_continue))
        .take()
        .parse_next(input)
}

/// Parse a specific keyword (must not be the prefix of a longer identifier).
fn keyword<'i>(input: &mut &'i str, word: &str) -> ModalResult<&'i str> {
    let checkpoint = *input;
    let ident = identifier(input)?;
    if ident == word {
        Ok(ident)
    } else {
        *input = checkpoint;
        Err(ErrMode::from_input(input))
    }
}

/// Parse a quoted string, returning its contents and quote style.
fn string_literal<'i>(input: &mut &'i str) -> ModalResult<(&'i str, Quote)> {
    alt((
        delimited('\'', take_till(0.., |c: char| c == '\'' || c == '\n'), '\'')
            .map(|s| (s, Quote::Single)),
        delimited('"', take_till(0.., |c: char| c == '"' || c == '\n'), '"')
            .map(|s| (s, Quote::Double)),
    ))
    .parse_next(input)
}

fn line_comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ("//", take_till(0.., |c: char| c == '\n' || c == '\r'))
        .take()
        .parse_next(input)
}

fn block_comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ("/*", take_until(0.., "*/"), "*/").take().parse_next(input)
}

fn comment<'i>(input: &mut &'i str) -> ModalResult<(&'i str, CommentKind)> {
    alt((
        line_comment.map(|t| (t, CommentKind::Line)),
        block_comment.map(|t| (t, CommentKind::Block)),
    ))
    .parse_next(input)
}

/// Skip whitespace and comments without recording them.
///
/// Returns true if a line break was crossed.
fn skip_trivia(input: &mut &str) -> bool {
    let mut crossed_newline = false;
    loop {
        let trimmed = input.trim_start();
        crossed_newline |= input[..input.len() - trimmed.len()].contains('\n');
        *input = trimmed;
        let checkpoint = *input;
        match comment(input) {
            Ok((text, _)) => crossed_newline |= text.contains('\n'),
            Err(_) => {
                *input = checkpoint;
                return crossed_newline;
            }
        }
    }
}

// ============================================================================
// Balanced scanning
// ============================================================================

/// Index just past a quoted string or template starting at `i`.
fn skip_quoted(bytes: &[u8], i: usize) -> Option<usize> {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            c if c == quote => return Some(j + 1),
            b'\n' if quote != b'`' => return None,
            _ => j += 1,
        }
    }
    None
}

/// Index just past a comment starting at `i`, if one starts there.
fn skip_comment_at(bytes: &[u8], i: usize) -> Option<usize> {
    match (bytes.get(i), bytes.get(i + 1)) {
        (Some(b'/'), Some(b'/')) => Some(
            bytes[i..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |p| i + p),
        ),
        (Some(b'/'), Some(b'*')) => bytes[i + 2..]
            .windows(2)
            .position(|w| w == b"*/")
            .map(|p| i + 2 + p + 2),
        _ => None,
    }
}

/// Length of the prefix of `text` through the `}` matching its leading `{`.
fn matching_brace(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(next) = skip_comment_at(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i)?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Length of one statement inside an ambient block.
///
/// Stops after a `;` or a line break at nesting depth zero, after a block
/// that returns to depth zero, or before an unmatched `}`.
fn statement_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(next) = skip_comment_at(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'{' | b'(' | b'[' => depth += 1,
            b'}' | b')' | b']' => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
                if depth == 0 && bytes[i] == b'}' {
                    return Some(i + 1);
                }
            }
            b';' if depth == 0 => return Some(i + 1),
            b'\n' if depth == 0 => return Some(i + 1),
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i)?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    Some(bytes.len())
}

// ============================================================================
// Cursor
// ============================================================================

/// Layout facts about a `{ ... }` specifier list.
#[derive(Debug, Default)]
struct BraceLayout {
    padding: bool,
    multiline: bool,
    indent: Option<String>,
}

/// The most recent top-level item, for comment attachment.
#[derive(Debug, Default, Clone, Copy)]
struct Previous {
    end_line: Option<u32>,
    /// Index into the item list when the item is an import.
    import: Option<usize>,
}

struct Cursor<'s> {
    source: &'s str,
    input: &'s str,
    lines: LineIndex,
    comments: CommentArena,
    dialect: Dialect,
}

impl<'s> Cursor<'s> {
    fn new(source: &'s str, dialect: Dialect) -> Self {
        Cursor {
            source,
            input: source,
            lines: LineIndex::new(source),
            comments: CommentArena::new(),
            dialect,
        }
    }

    fn offset(&self) -> usize {
        self.source.len() - self.input.len()
    }

    fn line_at(&self, offset: usize) -> u32 {
        self.lines.line_of(offset)
    }

    /// Line of the last byte of `span`.
    fn end_line(&self, span: Span) -> u32 {
        self.line_at(span.end.saturating_sub(1).max(span.start))
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line_at(self.offset()),
            message: message.into(),
        }
    }

    fn comment_line(&self, key: &CommentKey) -> u32 {
        self.comments
            .get(key)
            .map_or_else(|| self.line_at(key.start), |c| c.start_line)
    }

    /// Run a token parser, restoring the input if it fails.
    fn attempt<O>(&mut self, mut parser: impl FnMut(&mut &'s str) -> ModalResult<O>) -> Option<O> {
        let checkpoint = self.input;
        match parser(&mut self.input) {
            Ok(value) => Some(value),
            Err(_) => {
                self.input = checkpoint;
                None
            }
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), ParseError> {
        self.attempt(|input: &mut &'s str| keyword(input, word))
            .map(|_| ())
            .ok_or_else(|| self.error(format!("expected '{}'", word)))
    }

    fn expect_char(&mut self, c: char) -> Result<(), ParseError> {
        match self.input.strip_prefix(c) {
            Some(rest) => {
                self.input = rest;
                Ok(())
            }
            None => Err(self.error(format!("expected '{}'", c))),
        }
    }

    /// Skip whitespace and comments, recording each comment in the arena.
    fn trivia(&mut self) -> Vec<CommentKey> {
        let mut found = Vec::new();
        loop {
            self.input = self.input.trim_start();
            let start = self.offset();
            let Some((text, kind)) = self.attempt(comment) else {
                break;
            };
            let span = Span::new(start, self.offset());
            let key = self.comments.insert(Comment {
                key: CommentKey { start, kind },
                span,
                text: text.to_string(),
                start_line: self.line_at(start),
                end_line: self.end_line(span),
            });
            found.push(key);
        }
        found
    }

    // ------------------------------------------------------------------------
    // Program
    // ------------------------------------------------------------------------

    fn program(mut self) -> Result<Program, ParseError> {
        if let Some(rest) = self.input.strip_prefix('\u{feff}') {
            self.input = rest;
        }

        let mut previous = Previous::default();
        let mut interpreter = None;
        if self.input.starts_with("#!") {
            let start = self.offset();
            let _ = self.attempt(|input: &mut &'s str| {
                take_till(0.., |c: char| c == '\n' || c == '\r').parse_next(input)
            });
            let span = Span::new(start, self.offset());
            previous.end_line = Some(self.end_line(span));
            interpreter = Some(span);
        }

        let mut items: Vec<Item> = Vec::new();
        let mut in_prologue = true;
        loop {
            let comments = self.trivia();
            let start = self.offset();

            if self.input.is_empty() {
                self.attach_same_line(&mut items, previous, &comments);
                break;
            }

            if in_prologue {
                if let Some(span) = self.directive() {
                    items.push(Item::Directive { span });
                    previous = Previous {
                        end_line: Some(self.end_line(span)),
                        import: None,
                    };
                    continue;
                }
                in_prologue = false;
            }

            if self.at_import() {
                let mut decl = self.import_decl()?;
                self.attach_before_import(&mut items, previous, &comments, &mut decl);
                previous = Previous {
                    end_line: Some(decl.end_line),
                    import: Some(items.len()),
                };
                items.push(Item::Import(decl));
                continue;
            }

            self.attach_same_line(&mut items, previous, &comments);

            if self.dialect == Dialect::TypeScript && self.at_declare_module() {
                let item = self.ambient()?;
                previous = Previous {
                    end_line: Some(self.end_line(item.span())),
                    import: None,
                };
                items.push(item);
                continue;
            }

            items.push(Item::Code {
                span: Span::new(start, self.source.len()),
            });
            break;
        }

        Ok(Program {
            items,
            comments: self.comments,
            interpreter,
        })
    }

    /// Attach comments that precede an import.
    fn attach_before_import(
        &self,
        items: &mut [Item],
        previous: Previous,
        comments: &[CommentKey],
        decl: &mut ImportDecl,
    ) {
        match previous.import {
            Some(index) => {
                if let Some(Item::Import(prev)) = items.get_mut(index) {
                    prev.trailing.extend_from_slice(comments);
                }
                decl.leading.extend_from_slice(comments);
            }
            None => decl.leading.extend(
                comments
                    .iter()
                    .filter(|key| Some(self.comment_line(key)) != previous.end_line),
            ),
        }
    }

    /// Attach comments on the last import's final line to it.
    fn attach_same_line(&self, items: &mut [Item], previous: Previous, comments: &[CommentKey]) {
        let Some(index) = previous.import else {
            return;
        };
        if let Some(Item::Import(prev)) = items.get_mut(index) {
            prev.trailing.extend(
                comments
                    .iter()
                    .filter(|key| self.comment_line(key) == prev.end_line),
            );
        }
    }

    /// Parse a prologue directive if the input starts with one.
    fn directive(&mut self) -> Option<Span> {
        let start = self.offset();
        let checkpoint = self.input;
        self.attempt(string_literal)?;
        let after = self.input.trim_start_matches([' ', '\t']);
        if let Some(rest) = after.strip_prefix(';') {
            self.input = rest;
        } else if !(after.is_empty()
            || after.starts_with(['\n', '\r'])
            || after.starts_with("//")
            || after.starts_with("/*"))
        {
            self.input = checkpoint;
            return None;
        }
        Some(Span::new(start, self.offset()))
    }

    // ------------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------------

    /// True if the input starts an import declaration (not `import(...)`,
    /// `import.meta` or `import x = require(...)`).
    fn at_import(&self) -> bool {
        let mut input = self.input;
        if keyword(&mut input, "import").is_err() {
            return false;
        }
        skip_trivia(&mut input);
        if input.starts_with(['(', '.']) {
            return false;
        }

        let mut lookahead = input;
        if let Ok(first) = identifier(&mut lookahead) {
            skip_trivia(&mut lookahead);
            if lookahead.starts_with('=') && !lookahead.starts_with("==") {
                return false;
            }
            if first == "type" && self.dialect == Dialect::TypeScript && identifier(&mut lookahead).is_ok()
            {
                skip_trivia(&mut lookahead);
                if lookahead.starts_with('=') {
                    return false;
                }
            }
        }
        true
    }

    /// True if `type` after `import` is a modifier rather than a default
    /// binding named `type`.
    fn at_declaration_type_modifier(&self) -> bool {
        let mut lookahead = self.input;
        if keyword(&mut lookahead, "type").is_err() {
            return false;
        }
        skip_trivia(&mut lookahead);
        if lookahead.starts_with(['{', '*']) {
            return true;
        }
        match identifier(&mut lookahead) {
            Ok("from") => {
                skip_trivia(&mut lookahead);
                string_literal(&mut lookahead).is_err()
            }
            Ok(_) => true,
            Err(_) => false,
        }
    }

    /// True if `type` inside braces is a modifier rather than the imported name.
    fn at_inline_type_modifier(&self) -> bool {
        let mut lookahead = self.input;
        if keyword(&mut lookahead, "type").is_err() {
            return false;
        }
        skip_trivia(&mut lookahead);
        if lookahead.starts_with([',', '}']) {
            return false;
        }
        if keyword(&mut lookahead, "as").is_ok() {
            skip_trivia(&mut lookahead);
            if lookahead.starts_with([',', '}']) {
                // `type as`: type-only import of a binding named `as`
                return true;
            }
            if identifier(&mut lookahead).is_ok() {
                skip_trivia(&mut lookahead);
                // `type as x` renames `type`; `type as as x` is type-only
                return !lookahead.starts_with([',', '}']);
            }
        }
        true
    }

    fn at_declare_module(&self) -> bool {
        let mut lookahead = self.input;
        if keyword(&mut lookahead, "declare").is_err() {
            return false;
        }
        skip_trivia(&mut lookahead);
        if keyword(&mut lookahead, "module").is_err() {
            return false;
        }
        skip_trivia(&mut lookahead);
        string_literal(&mut lookahead).is_ok()
    }

    // ------------------------------------------------------------------------
    // Import declarations
    // ------------------------------------------------------------------------

    fn import_decl(&mut self) -> Result<ImportDecl, ParseError> {
        let start = self.offset();
        self.expect_keyword("import")?;
        let mut inner = self.trivia();

        let mut kind = ImportKind::Value;
        if self.dialect == Dialect::TypeScript && self.at_declaration_type_modifier() {
            self.expect_keyword("type")?;
            inner.extend(self.trivia());
            kind = ImportKind::Type;
        }

        let mut specifiers = Vec::new();
        let mut layout = BraceLayout::default();
        let (source, quote) = match self.attempt(string_literal) {
            Some(literal) => literal,
            None => {
                self.import_clause(&mut specifiers, &mut inner, &mut layout)?;
                inner.extend(self.trivia());
                self.expect_keyword("from")?;
                inner.extend(self.trivia());
                self.attempt(string_literal)
                    .ok_or_else(|| self.error("expected module source string after 'from'"))?
            }
        };

        let attributes = self.attributes(&mut inner)?;
        let has_semicolon = self.semicolon(&mut inner);
        let span = Span::new(start, self.offset());

        Ok(ImportDecl {
            span,
            start_line: self.line_at(start),
            end_line: self.end_line(span),
            source: source.to_string(),
            quote,
            kind,
            specifiers,
            attributes,
            has_semicolon,
            brace_padding: layout.padding,
            multiline: layout.multiline,
            indent: layout.indent,
            leading: Vec::new(),
            trailing: Vec::new(),
            inner,
        })
    }

    fn import_clause(
        &mut self,
        specifiers: &mut Vec<ImportSpecifier>,
        inner: &mut Vec<CommentKey>,
        layout: &mut BraceLayout,
    ) -> Result<(), ParseError> {
        if self.input.starts_with('*') {
            return self.namespace_specifier(specifiers, inner);
        }
        if self.input.starts_with('{') {
            return self.named_specifiers(specifiers, inner, layout);
        }

        let start = self.offset();
        let local = self
            .attempt(identifier)
            .ok_or_else(|| self.error("expected import clause or module source"))?;
        let span = Span::new(start, self.offset());
        specifiers.push(ImportSpecifier {
            span,
            kind: SpecifierKind::Default,
            local: local.to_string(),
            imported: None,
            is_type: false,
            start_line: self.line_at(start),
            end_line: self.end_line(span),
            leading: Vec::new(),
            trailing: Vec::new(),
        });

        inner.extend(self.trivia());
        if let Some(rest) = self.input.strip_prefix(',') {
            self.input = rest;
            inner.extend(self.trivia());
            if self.input.starts_with('*') {
                return self.namespace_specifier(specifiers, inner);
            }
            if self.input.starts_with('{') {
                return self.named_specifiers(specifiers, inner, layout);
            }
            return Err(self.error("expected '{' or '*' after default import"));
        }
        Ok(())
    }

    fn namespace_specifier(
        &mut self,
        specifiers: &mut Vec<ImportSpecifier>,
        inner: &mut Vec<CommentKey>,
    ) -> Result<(), ParseError> {
        let start = self.offset();
        self.expect_char('*')?;
        inner.extend(self.trivia());
        self.expect_keyword("as")?;
        inner.extend(self.trivia());
        let local = self
            .attempt(identifier)
            .ok_or_else(|| self.error("expected namespace binding after 'as'"))?;
        let span = Span::new(start, self.offset());
        specifiers.push(ImportSpecifier {
            span,
            kind: SpecifierKind::Namespace,
            local: local.to_string(),
            imported: None,
            is_type: false,
            start_line: self.line_at(start),
            end_line: self.end_line(span),
            leading: Vec::new(),
            trailing: Vec::new(),
        });
        Ok(())
    }

    fn named_specifiers(
        &mut self,
        specifiers: &mut Vec<ImportSpecifier>,
        inner: &mut Vec<CommentKey>,
        layout: &mut BraceLayout,
    ) -> Result<(), ParseError> {
        let open = self.offset();
        self.expect_char('{')?;
        layout.padding = self.input.starts_with(' ');

        let first = specifiers.len();
        let mut pending: Vec<CommentKey> = Vec::new();
        loop {
            let found = self.trivia();
            self.distribute(found, &mut specifiers[first..], &mut pending);

            if let Some(rest) = self.input.strip_prefix('}') {
                self.input = rest;
                break;
            }
            if self.input.is_empty() {
                return Err(self.error("unterminated import specifier list"));
            }

            let mut specifier = self.named_specifier()?;
            specifier.leading = std::mem::take(&mut pending);
            specifiers.push(specifier);

            let found = self.trivia();
            self.distribute(found, &mut specifiers[first..], &mut pending);

            if let Some(rest) = self.input.strip_prefix(',') {
                self.input = rest;
            } else if let Some(rest) = self.input.strip_prefix('}') {
                self.input = rest;
                break;
            } else {
                return Err(self.error("expected ',' or '}' in import specifier list"));
            }
        }

        if !pending.is_empty() {
            match specifiers[first..].last_mut() {
                Some(last) => last.trailing.append(&mut pending),
                None => inner.append(&mut pending),
            }
        }

        layout.multiline = self.source[open..self.offset()].contains('\n');
        if layout.multiline {
            layout.indent = specifiers.get(first).and_then(|spec| {
                let line_start = self.lines.line_start(spec.start_line)?;
                let prefix = &self.source[line_start..spec.span.start];
                prefix
                    .chars()
                    .all(|c| c == ' ' || c == '\t')
                    .then(|| prefix.to_string())
            });
        }
        Ok(())
    }

    /// Route comments found inside braces: same line as the previous
    /// specifier's end trails it, anything else waits for the next specifier.
    fn distribute(
        &self,
        found: Vec<CommentKey>,
        named: &mut [ImportSpecifier],
        pending: &mut Vec<CommentKey>,
    ) {
        for key in found {
            match named.last_mut() {
                Some(last) if pending.is_empty() && self.comment_line(&key) == last.end_line => {
                    last.trailing.push(key)
                }
                _ => pending.push(key),
            }
        }
    }

    fn named_specifier(&mut self) -> Result<ImportSpecifier, ParseError> {
        let start = self.offset();
        let mut trailing = Vec::new();

        let mut is_type = false;
        if self.dialect == Dialect::TypeScript && self.at_inline_type_modifier() {
            self.expect_keyword("type")?;
            trailing.extend(self.trivia());
            is_type = true;
        }

        let source = self.source;
        let name_start = self.offset();
        let quoted = self.attempt(string_literal).is_some();
        if !quoted && self.attempt(identifier).is_none() {
            return Err(self.error("expected import specifier"));
        }
        let name = &source[name_start..self.offset()];

        let mut lookahead = self.input;
        skip_trivia(&mut lookahead);
        let (local, imported) = if keyword(&mut lookahead, "as").is_ok() {
            trailing.extend(self.trivia());
            self.expect_keyword("as")?;
            trailing.extend(self.trivia());
            let local = self
                .attempt(identifier)
                .ok_or_else(|| self.error("expected local binding after 'as'"))?;
            (local.to_string(), Some(name.to_string()))
        } else if quoted {
            return Err(self.error("string import name requires 'as'"));
        } else {
            (name.to_string(), None)
        };

        let span = Span::new(start, self.offset());
        Ok(ImportSpecifier {
            span,
            kind: SpecifierKind::Named,
            local,
            imported,
            is_type,
            start_line: self.line_at(start),
            end_line: self.end_line(span),
            leading: Vec::new(),
            trailing,
        })
    }

    /// Parse `with { ... }` / `assert { ... }` verbatim.
    fn attributes(&mut self, inner: &mut Vec<CommentKey>) -> Result<Option<String>, ParseError> {
        let mut lookahead = self.input;
        let crossed_newline = skip_trivia(&mut lookahead);
        let allowed = match identifier(&mut lookahead) {
            Ok("with") => true,
            Ok("assert") => !crossed_newline,
            _ => false,
        };
        if !allowed {
            return Ok(None);
        }
        skip_trivia(&mut lookahead);
        if !lookahead.starts_with('{') {
            return Ok(None);
        }

        inner.extend(self.trivia());
        let start = self.offset();
        let _ = self.attempt(identifier);
        skip_trivia(&mut self.input);
        let len = matching_brace(self.input)
            .ok_or_else(|| self.error("unterminated import attributes"))?;
        self.input = &self.input[len..];
        Ok(Some(self.source[start..self.offset()].to_string()))
    }

    /// Consume a `;` on the same line, possibly after block comments.
    fn semicolon(&mut self, inner: &mut Vec<CommentKey>) -> bool {
        let mut lookahead = self.input;
        loop {
            lookahead = lookahead.trim_start_matches([' ', '\t']);
            let checkpoint = lookahead;
            match block_comment(&mut lookahead) {
                Ok(text) if !text.contains('\n') => {}
                _ => {
                    lookahead = checkpoint;
                    break;
                }
            }
        }
        if !lookahead.starts_with(';') {
            return false;
        }
        inner.extend(self.trivia());
        self.input = &self.input[1..];
        true
    }

    // ------------------------------------------------------------------------
    // Ambient modules
    // ------------------------------------------------------------------------

    fn ambient(&mut self) -> Result<Item, ParseError> {
        let start = self.offset();
        self.expect_keyword("declare")?;
        skip_trivia(&mut self.input);
        self.expect_keyword("module")?;
        skip_trivia(&mut self.input);
        let _ = self.attempt(string_literal);

        let mut lookahead = self.input;
        skip_trivia(&mut lookahead);
        if !lookahead.starts_with('{') {
            if let Some(rest) = lookahead.strip_prefix(';') {
                self.input = rest;
            }
            return Ok(Item::Ambient {
                span: Span::new(start, self.offset()),
                imports: Vec::new(),
            });
        }
        self.input = &lookahead[1..];

        let mut imports = Vec::new();
        loop {
            let _ = self.trivia();
            if let Some(rest) = self.input.strip_prefix('}') {
                self.input = rest;
                break;
            }
            if self.input.is_empty() {
                return Err(self.error("unterminated 'declare module' block"));
            }
            if self.at_import() {
                imports.push(self.import_decl()?);
                continue;
            }
            let len = statement_len(self.input)
                .ok_or_else(|| self.error("unterminated string in 'declare module' block"))?;
            if len == 0 {
                return Err(self.error("unexpected '}' in 'declare module' block"));
            }
            self.input = &self.input[len..];
        }

        Ok(Item::Ambient {
            span: Span::new(start, self.offset()),
            imports,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ts(source: &str) -> Program {
        parse(source, &ParseOptions::default()).unwrap()
    }

    fn imports(program: &Program) -> Vec<&ImportDecl> {
        program.imports().collect()
    }

    fn comment_texts(program: &Program, keys: &[CommentKey]) -> Vec<String> {
        keys.iter()
            .map(|k| program.comments.get(k).unwrap().text.clone())
            .collect()
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    mod declarations {
        use super::*;

        #[test]
        fn side_effect_import() {
            let program = parse_ts("import './styles.css';\n");
            let decl = imports(&program)[0];
            assert_eq!(decl.source, "./styles.css");
            assert!(decl.is_side_effect());
            assert!(decl.has_semicolon);
            assert_eq!(decl.span, Span::new(0, 22));
        }

        #[test]
        fn default_namespace_and_named() {
            let program = parse_ts(
                "import React from \"react\"\nimport * as path from 'path';\nimport D, { a, b as c } from 'm';\n",
            );
            let decls = imports(&program);
            assert_eq!(decls.len(), 3);
            assert_eq!(decls[0].quote, Quote::Double);
            assert!(!decls[0].has_semicolon);
            assert_eq!(decls[1].specifiers[0].kind, SpecifierKind::Namespace);
            assert_eq!(decls[1].specifiers[0].local, "path");

            let specs = &decls[2].specifiers;
            assert_eq!(specs.len(), 3);
            assert_eq!(specs[0].kind, SpecifierKind::Default);
            assert_eq!(specs[2].local, "c");
            assert_eq!(specs[2].imported.as_deref(), Some("b"));
            assert!(decls[2].brace_padding);
        }

        #[test]
        fn type_imports() {
            let program = parse_ts(
                "import type { A } from 'a';\nimport { type B, c, type as } from 'b';\nimport type from 'c';\n",
            );
            let decls = imports(&program);
            assert_eq!(decls[0].kind, ImportKind::Type);
            assert!(decls[1].specifiers[0].is_type);
            assert!(!decls[1].specifiers[1].is_type);
            assert!(decls[1].specifiers[2].is_type);
            assert_eq!(decls[1].specifiers[2].local, "as");
            assert_eq!(decls[2].kind, ImportKind::Value);
            assert_eq!(decls[2].specifiers[0].local, "type");
        }

        #[test]
        fn type_renamed_is_a_value_import() {
            let program = parse_ts("import { type as t } from 'b';\n");
            let spec = &imports(&program)[0].specifiers[0];
            assert!(!spec.is_type);
            assert_eq!(spec.local, "t");
            assert_eq!(spec.imported.as_deref(), Some("type"));
        }

        #[test]
        fn javascript_has_no_type_modifier() {
            let options = ParseOptions {
                dialect: Dialect::JavaScript,
            };
            let program = parse("import { type } from 'x';\n", &options).unwrap();
            let decl = imports(&program)[0];
            assert_eq!(decl.specifiers[0].local, "type");
            assert!(!decl.specifiers[0].is_type);
        }

        #[test]
        fn string_import_name() {
            let program = parse_ts("import { \"a-b\" as ab } from 'x';\n");
            let spec = &imports(&program)[0].specifiers[0];
            assert_eq!(spec.imported.as_deref(), Some("\"a-b\""));
            assert_eq!(spec.local, "ab");
        }

        #[test]
        fn import_attributes_kept_verbatim() {
            let program = parse_ts("import data from './d.json' with { type: 'json' };\n");
            let decl = imports(&program)[0];
            assert_eq!(decl.attributes.as_deref(), Some("with { type: 'json' }"));
            assert!(decl.has_semicolon);
        }

        #[test]
        fn multiline_layout() {
            let program = parse_ts("import {\n    a,\n    b,\n} from 'x';\n");
            let decl = imports(&program)[0];
            assert!(decl.multiline);
            assert_eq!(decl.indent.as_deref(), Some("    "));
            assert_eq!(decl.start_line, 1);
            assert_eq!(decl.end_line, 4);
        }
    }

    // =========================================================================
    // Program structure
    // =========================================================================

    mod structure {
        use super::*;

        #[test]
        fn region_ends_at_first_statement() {
            let program = parse_ts("import a from 'a';\nconst x = 1;\nimport b from 'b';\n");
            assert_eq!(imports(&program).len(), 1);
            match program.items.last() {
                Some(Item::Code { span }) => assert_eq!(span.start, 19),
                other => panic!("expected code item, got {:?}", other),
            }
        }

        #[test]
        fn dynamic_import_and_meta_are_code() {
            for source in [
                "import('x');\n",
                "import.meta.url;\n",
                "import fs = require('fs');\n",
            ] {
                let program = parse_ts(source);
                assert_eq!(imports(&program).len(), 0, "{}", source);
            }
        }

        #[test]
        fn interpreter_and_directives() {
            let program = parse_ts("#!/usr/bin/env node\n'use strict';\n\"use client\"\nimport a from 'a';\n");
            assert!(program.interpreter.is_some());
            assert!(matches!(program.items[0], Item::Directive { .. }));
            assert!(matches!(program.items[1], Item::Directive { .. }));
            assert_eq!(imports(&program).len(), 1);
        }

        #[test]
        fn declare_module_imports_are_nested() {
            let source = "import a from 'a';\ndeclare module 'x' {\n  import b from 'b';\n  export function f(): void;\n  interface I { n: number }\n}\nimport c from 'c';\n";
            let program = parse_ts(source);
            let top: Vec<_> = imports(&program).iter().map(|d| d.source.clone()).collect();
            assert_eq!(top, vec!["a", "c"]);
            match &program.items[1] {
                Item::Ambient { imports, .. } => assert_eq!(imports[0].source, "b"),
                other => panic!("expected ambient item, got {:?}", other),
            }
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    mod comments {
        use super::*;

        #[test]
        fn comments_between_imports_are_shared() {
            let program = parse_ts("import a from 'a'; // ta\n// lb\nimport b from 'b';\n");
            let decls = imports(&program);
            assert_eq!(comment_texts(&program, &decls[0].trailing), vec!["// ta", "// lb"]);
            assert_eq!(comment_texts(&program, &decls[1].leading), vec!["// ta", "// lb"]);
        }

        #[test]
        fn after_last_import_only_same_line() {
            let program = parse_ts("import a from 'a'; /* t */\n// about code\nrun();\n");
            let decl = imports(&program)[0];
            assert_eq!(comment_texts(&program, &decl.trailing), vec!["/* t */"]);
            assert_eq!(program.comments.len(), 2);
        }

        #[test]
        fn comments_before_directives_are_not_attached() {
            let program = parse_ts("// license\n'use strict'; // strict\n// lead\nimport a from 'a';\n");
            let decl = imports(&program)[0];
            assert_eq!(comment_texts(&program, &decl.leading), vec!["// lead"]);
        }

        #[test]
        fn specifier_comments() {
            let source = "import {\n  // lead b\n  b, // trail b\n  a /* trail a */,\n  // dangling\n} from 'x'; // end\n";
            let program = parse_ts(source);
            let decl = imports(&program)[0];
            let b = &decl.specifiers[0];
            let a = &decl.specifiers[1];
            assert_eq!(comment_texts(&program, &b.leading), vec!["// lead b"]);
            assert_eq!(comment_texts(&program, &b.trailing), vec!["// trail b"]);
            assert_eq!(
                comment_texts(&program, &a.trailing),
                vec!["/* trail a */", "// dangling"]
            );
            assert_eq!(comment_texts(&program, &decl.trailing), vec!["// end"]);
        }

        #[test]
        fn inner_comments() {
            let program = parse_ts("import /* i */ x from 'x';\nimport {/* e */} from 'y';\n");
            let decls = imports(&program);
            assert_eq!(comment_texts(&program, &decls[0].inner), vec!["/* i */"]);
            assert_eq!(comment_texts(&program, &decls[1].inner), vec!["/* e */"]);
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    mod errors {
        use super::*;

        #[test]
        fn missing_from() {
            let err = parse("import a 'a';\n", &ParseOptions::default()).unwrap_err();
            assert_eq!(err.line, 1);
            assert!(err.message.contains("'from'"), "{}", err.message);
        }

        #[test]
        fn unterminated_braces() {
            let err = parse("\nimport { a, b from 'x';\n", &ParseOptions::default()).unwrap_err();
            assert_eq!(err.line, 2);
        }

        #[test]
        fn string_name_without_alias() {
            let err = parse("import { 'a' } from 'x';\n", &ParseOptions::default()).unwrap_err();
            assert!(err.message.contains("requires 'as'"));
        }
    }
}
