// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Engine data model: import statements and specifiers as the sorter sees
//! them.
//!
//! Parsed declarations are converted into [`ImportStatement`]s by the
//! extractor. Every statement and specifier carries a [`NodeKey`] derived
//! from its original byte offset, so identity survives merging, splitting
//! and reordering. Comments are referenced by [`CommentKey`] into the
//! parser's arena.

use tugsort_core::range::Span;

use crate::ast::{CommentKey, Quote, SpecifierKind};

/// What a [`NodeKey`] identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeClass {
    /// A statement that exists in the original text.
    Statement,
    /// A specifier that exists in the original text.
    Specifier,
    /// The type-only half of a statement split by the exploder.
    SplitStatement,
}

/// Stable identity of a statement or specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    /// Original byte offset of the node (for split statements, of the
    /// statement they were split from).
    pub start: usize,
    pub class: NodeClass,
}

impl NodeKey {
    pub fn statement(start: usize) -> Self {
        NodeKey {
            start,
            class: NodeClass::Statement,
        }
    }

    pub fn specifier(start: usize) -> Self {
        NodeKey {
            start,
            class: NodeClass::Specifier,
        }
    }

    pub fn split(start: usize) -> Self {
        NodeKey {
            start,
            class: NodeClass::SplitStatement,
        }
    }
}

/// Statement flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// `import ... from`
    Value,
    /// `import type ... from`
    Type,
    /// Binds nothing: `import 'x'`.
    SideEffect,
    /// Carries import attributes; never merged.
    Ignored,
}

impl Flavor {
    /// Whether statements of this flavor may take part in merging.
    pub fn is_mergeable(self) -> bool {
        matches!(self, Flavor::Value | Flavor::Type)
    }
}

/// Specifier flavor.
///
/// The derived order puts value specifiers before type specifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecifierFlavor {
    Value,
    Type,
}

/// One binding of an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub key: NodeKey,
    pub kind: SpecifierKind,
    pub local: String,
    /// Imported name as written, when it differs from `local`.
    pub imported: Option<String>,
    pub flavor: SpecifierFlavor,
    pub start_line: u32,
    pub end_line: u32,
    /// Statement the specifier was parsed in.
    pub origin: NodeKey,
    /// Position within the origin statement's specifier list.
    pub slot: usize,
    pub leading: Vec<CommentKey>,
    pub trailing: Vec<CommentKey>,
}

impl Specifier {
    /// Source text of the binding, without comments.
    ///
    /// `inline_type` adds the `type` modifier to type specifiers.
    pub fn render(&self, inline_type: bool) -> String {
        let mut out = String::new();
        if inline_type && self.flavor == SpecifierFlavor::Type {
            out.push_str("type ");
        }
        match self.kind {
            SpecifierKind::Default => out.push_str(&self.local),
            SpecifierKind::Namespace => {
                out.push_str("* as ");
                out.push_str(&self.local);
            }
            SpecifierKind::Named => {
                if let Some(imported) = &self.imported {
                    out.push_str(imported);
                    out.push_str(" as ");
                }
                out.push_str(&self.local);
            }
        }
        out
    }
}

/// An import statement flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub key: NodeKey,
    /// Original byte range. Split statements share the range of the
    /// statement they came from.
    pub span: Span,
    pub start_line: u32,
    pub end_line: u32,
    pub source: String,
    pub quote: Quote,
    pub flavor: Flavor,
    pub specifiers: Vec<Specifier>,
    pub attributes: Option<String>,
    pub has_semicolon: bool,
    pub brace_padding: bool,
    pub multiline: bool,
    pub indent: Option<String>,
    pub leading: Vec<CommentKey>,
    pub trailing: Vec<CommentKey>,
    pub inner: Vec<CommentKey>,
    /// Ranges of statements merged into this one.
    pub absorbed: Vec<Span>,
    /// Original position among the file's imports.
    pub order: usize,
    /// Set by merging and splitting; forces regeneration.
    pub touched: bool,
}

impl ImportStatement {
    pub fn is_side_effect(&self) -> bool {
        self.specifiers.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.specifiers
            .iter()
            .any(|s| s.kind == SpecifierKind::Default)
    }

    pub fn has_namespace(&self) -> bool {
        self.specifiers
            .iter()
            .any(|s| s.kind == SpecifierKind::Namespace)
    }

    /// Named specifiers, in order.
    pub fn named(&self) -> impl Iterator<Item = &Specifier> {
        self.specifiers
            .iter()
            .filter(|s| s.kind == SpecifierKind::Named)
    }

    /// True when the original source slice still renders this statement
    /// exactly: nothing merged in or split off, and every specifier is its
    /// own, in its original position.
    pub fn is_clean(&self) -> bool {
        !self.touched
            && self.key.class == NodeClass::Statement
            && self
                .specifiers
                .iter()
                .enumerate()
                .all(|(index, spec)| spec.origin == self.key && spec.slot == index)
    }

    /// Every comment referenced by the statement or its specifiers.
    pub fn comment_keys(&self) -> impl Iterator<Item = &CommentKey> {
        self.leading
            .iter()
            .chain(&self.trailing)
            .chain(&self.inner)
            .chain(
                self.specifiers
                    .iter()
                    .flat_map(|s| s.leading.iter().chain(&s.trailing)),
            )
    }

    /// Ranges this statement owns in the original text.
    pub fn original_spans(&self) -> impl Iterator<Item = Span> + '_ {
        std::iter::once(self.span).chain(self.absorbed.iter().copied())
    }
}

/// One element of the arranged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Statement(ImportStatement),
    /// A blank line between groups.
    Separator,
}

impl OutputItem {
    pub fn as_statement(&self) -> Option<&ImportStatement> {
        match self {
            OutputItem::Statement(stmt) => Some(stmt),
            OutputItem::Separator => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, OutputItem::Separator)
    }
}

/// Statements of an output list, skipping separators.
pub fn statements(items: &[OutputItem]) -> impl Iterator<Item = &ImportStatement> {
    items.iter().filter_map(OutputItem::as_statement)
}

/// Drop leading, trailing and repeated separators.
pub fn normalize_separators(items: &mut Vec<OutputItem>) {
    let mut normalized = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if item.is_separator()
            && normalized
                .last()
                .is_none_or(|last: &OutputItem| last.is_separator())
        {
            continue;
        }
        normalized.push(item);
    }
    if normalized.last().is_some_and(OutputItem::is_separator) {
        normalized.pop();
    }
    *items = normalized;
}
