// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statement extraction: parsed declarations to engine statements.

use tracing::debug;

use crate::ast::{ImportDecl, ImportKind, ImportSpecifier, Program};
use crate::model::{Flavor, ImportStatement, NodeKey, Specifier, SpecifierFlavor};

/// Top-level imports of `program`, in source order.
///
/// Imports nested in `declare module` blocks are not extracted.
pub fn extract_imports(program: &Program) -> Vec<ImportStatement> {
    let statements: Vec<ImportStatement> = program
        .imports()
        .enumerate()
        .map(|(order, decl)| statement_from_decl(decl, order))
        .collect();
    debug!(count = statements.len(), "extracted top-level imports");
    statements
}

fn statement_from_decl(decl: &ImportDecl, order: usize) -> ImportStatement {
    let key = NodeKey::statement(decl.span.start);
    let flavor = if decl.attributes.is_some() {
        Flavor::Ignored
    } else if decl.is_side_effect() {
        Flavor::SideEffect
    } else if decl.kind == ImportKind::Type {
        Flavor::Type
    } else {
        Flavor::Value
    };
    let type_only = decl.kind == ImportKind::Type;

    ImportStatement {
        key,
        span: decl.span,
        start_line: decl.start_line,
        end_line: decl.end_line,
        source: decl.source.clone(),
        quote: decl.quote,
        flavor,
        specifiers: decl
            .specifiers
            .iter()
            .enumerate()
            .map(|(slot, spec)| specifier_from_ast(spec, key, slot, type_only))
            .collect(),
        attributes: decl.attributes.clone(),
        has_semicolon: decl.has_semicolon,
        brace_padding: decl.brace_padding,
        multiline: decl.multiline,
        indent: decl.indent.clone(),
        leading: decl.leading.clone(),
        trailing: decl.trailing.clone(),
        inner: decl.inner.clone(),
        absorbed: Vec::new(),
        order,
        touched: false,
    }
}

fn specifier_from_ast(
    spec: &ImportSpecifier,
    origin: NodeKey,
    slot: usize,
    type_only: bool,
) -> Specifier {
    Specifier {
        key: NodeKey::specifier(spec.span.start),
        kind: spec.kind,
        local: spec.local.clone(),
        imported: spec.imported.clone(),
        flavor: if type_only || spec.is_type {
            SpecifierFlavor::Type
        } else {
            SpecifierFlavor::Value
        },
        start_line: spec.start_line,
        end_line: spec.end_line,
        origin,
        slot,
        leading: spec.leading.clone(),
        trailing: spec.trailing.clone(),
    }
}
