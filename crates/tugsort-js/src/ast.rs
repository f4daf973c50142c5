// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parse tree for the import region of a JavaScript/TypeScript file.
//!
//! The parser only understands the leading part of a module: an optional
//! interpreter line, the directive prologue, import declarations and ambient
//! `declare module` blocks. Everything from the first other statement onward
//! is a single opaque [`Item::Code`] item.
//!
//! Comments are stored once in a [`CommentArena`] and referenced everywhere
//! else by [`CommentKey`].

use std::collections::BTreeMap;

use tugsort_core::range::Span;

// ============================================================================
// Dialect
// ============================================================================

/// Source dialect. TypeScript enables `import type`, inline `type`
/// specifiers and `declare module` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    JavaScript,
    #[default]
    TypeScript,
}

impl Dialect {
    /// Pick the dialect for a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "ts" | "tsx" | "mts" | "cts" => Dialect::TypeScript,
            _ => Dialect::JavaScript,
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub dialect: Dialect,
}

// ============================================================================
// Comments
// ============================================================================

/// Line (`// ...`) or block (`/* ... */`) comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommentKind {
    Line,
    Block,
}

/// Stable identity of a comment: its original byte offset and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentKey {
    pub start: usize,
    pub kind: CommentKind,
}

/// A comment as it appears in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub key: CommentKey,
    pub span: Span,
    /// Full text including delimiters.
    pub text: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl Comment {
    pub fn kind(&self) -> CommentKind {
        self.key.kind
    }

    /// Comment text with delimiters stripped and surrounding whitespace
    /// trimmed.
    pub fn body(&self) -> &str {
        let inner = match self.key.kind {
            CommentKind::Line => self.text.strip_prefix("//").unwrap_or(&self.text),
            CommentKind::Block => self
                .text
                .strip_prefix("/*")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(&self.text),
        };
        inner.trim()
    }

    /// True if the comment spans more than one line.
    pub fn is_multiline(&self) -> bool {
        self.end_line > self.start_line
    }
}

/// Owning store for every comment the parser saw.
#[derive(Debug, Clone, Default)]
pub struct CommentArena {
    comments: BTreeMap<CommentKey, Comment>,
}

impl CommentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a comment and return its key. Re-inserting the same key is a no-op.
    pub fn insert(&mut self, comment: Comment) -> CommentKey {
        let key = comment.key;
        self.comments.entry(key).or_insert(comment);
        key
    }

    pub fn get(&self, key: &CommentKey) -> Option<&Comment> {
        self.comments.get(key)
    }

    /// Comments in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.values()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

// ============================================================================
// Import Declarations
// ============================================================================

/// Quote character around a module source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
    #[default]
    Single,
    Double,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

/// `import` or `import type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Value,
    Type,
}

/// Shape of an import specifier.
///
/// The derived order is the order specifiers are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecifierKind {
    /// `import x from ...`
    Default,
    /// `import * as x from ...`
    Namespace,
    /// `import { x } from ...`
    Named,
}

/// One binding introduced by an import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub span: Span,
    pub kind: SpecifierKind,
    /// Local binding name.
    pub local: String,
    /// Imported name as written (identifier or quoted string) when it
    /// differs from `local`.
    pub imported: Option<String>,
    /// Inline `type` modifier.
    pub is_type: bool,
    pub start_line: u32,
    pub end_line: u32,
    pub leading: Vec<CommentKey>,
    pub trailing: Vec<CommentKey>,
}

/// A complete import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub span: Span,
    pub start_line: u32,
    pub end_line: u32,
    /// Module source without quotes.
    pub source: String,
    pub quote: Quote,
    pub kind: ImportKind,
    pub specifiers: Vec<ImportSpecifier>,
    /// `with { ... }` or `assert { ... }`, verbatim.
    pub attributes: Option<String>,
    pub has_semicolon: bool,
    /// Named specifiers are written `{ a }` rather than `{a}`.
    pub brace_padding: bool,
    /// The named specifier list spans several lines.
    pub multiline: bool,
    /// Indentation of the first named specifier in a multi-line list.
    pub indent: Option<String>,
    pub leading: Vec<CommentKey>,
    pub trailing: Vec<CommentKey>,
    /// Comments inside the declaration that belong to no specifier.
    pub inner: Vec<CommentKey>,
}

impl ImportDecl {
    /// True if the declaration binds nothing (`import 'x'` or `import {} from 'x'`).
    pub fn is_side_effect(&self) -> bool {
        self.specifiers.is_empty()
    }
}

// ============================================================================
// Program
// ============================================================================

/// Top-level item of the import region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Import(ImportDecl),
    /// `declare module "x" { ... }`; nested imports are recorded but belong
    /// to the ambient scope.
    Ambient { span: Span, imports: Vec<ImportDecl> },
    /// A prologue directive such as `"use client";`.
    Directive { span: Span },
    /// Everything from the first non-import statement to end of file.
    Code { span: Span },
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Import(decl) => decl.span,
            Item::Ambient { span, .. } | Item::Directive { span } | Item::Code { span } => *span,
        }
    }
}

/// Parsed file.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<Item>,
    pub comments: CommentArena,
    /// `#!` line, if present.
    pub interpreter: Option<Span>,
}

impl Program {
    /// Top-level import declarations in source order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Import(decl) => Some(decl),
            _ => None,
        })
    }
}
