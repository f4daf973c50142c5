// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Splitting mixed value/type statements.
//!
//! When the import order has type-scoped groups, `import D, {v, type T}`
//! must be able to land in two places. The value part keeps the original
//! statement's identity and comments; the type part becomes a new type-only
//! statement keyed as a [`NodeClass::SplitStatement`](crate::model::NodeClass).

use tracing::trace;

use crate::ast::SpecifierKind;
use crate::model::{Flavor, ImportStatement, NodeKey, SpecifierFlavor};

/// Split every value statement whose named specifiers mix value and type
/// flavors into a value statement and a type statement.
pub fn explode_type_specifiers(statements: Vec<ImportStatement>) -> Vec<ImportStatement> {
    let mut out = Vec::with_capacity(statements.len());
    for statement in statements {
        if !is_mixed(&statement) {
            out.push(statement);
            continue;
        }

        let mut value = statement;
        let (types, values): (Vec<_>, Vec<_>) = std::mem::take(&mut value.specifiers)
            .into_iter()
            .partition(|spec| {
                spec.kind == SpecifierKind::Named && spec.flavor == SpecifierFlavor::Type
            });
        value.specifiers = values;
        value.touched = true;

        trace!(
            source = %value.source,
            types = types.len(),
            "splitting type specifiers into their own statement"
        );

        let split = ImportStatement {
            key: NodeKey::split(value.key.start),
            flavor: Flavor::Type,
            specifiers: types,
            attributes: None,
            leading: Vec::new(),
            trailing: Vec::new(),
            inner: Vec::new(),
            absorbed: Vec::new(),
            touched: true,
            ..value.clone()
        };

        out.push(value);
        out.push(split);
    }
    out
}

fn is_mixed(statement: &ImportStatement) -> bool {
    if statement.flavor != Flavor::Value {
        return false;
    }
    let mut has_value = false;
    let mut has_type = false;
    for spec in statement.named() {
        match spec.flavor {
            SpecifierFlavor::Value => has_value = true,
            SpecifierFlavor::Type => has_type = true,
        }
    }
    has_value && has_type
}
