// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recognizer for the forms that bind a name to a module: a direct
//! `require(...)` (or `new require(...)`) call, a bare alias of an
//! existing module-referencing binding, a declarative default/namespace
//! import, and a dynamic `import('literal')`.

use oxc_ast::ast::{Argument, Expression, VariableDeclarator};

use crate::scope::Scope;

/// The module a variable declarator's initializer was recognized as
/// referencing, to be applied to the declarator's bound name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizedImport {
    Module(String),
}

/// Pull a literal string argument out of a `require(...)`-shaped call:
/// callee is the bare identifier `require`, first argument is a string
/// literal. Shared between the direct-call case and the
/// member-expression-off-a-call case (`require('m').x`).
pub fn require_call_module_literal<'a>(
    callee: &Expression<'a>,
    arguments: &oxc_allocator::Vec<'a, Argument<'a>>,
) -> Option<String> {
    let Expression::Identifier(callee_ident) = callee else {
        return None;
    };
    if callee_ident.name.as_str() != "require" {
        return None;
    }
    match arguments.first()? {
        Argument::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

/// A dynamic `import('literal')` expression's statically-known source,
/// folded into the same recognition path as `require`: both bind a
/// name to a module when given a literal string source.
pub fn dynamic_import_module_literal<'a>(source: &Expression<'a>) -> Option<String> {
    match source {
        Expression::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

/// Recognize whether `declarator`'s initializer binds its target to a
/// module: a direct `require`/dynamic-`import` call, or a bare alias of
/// an existing module-referencing binding. Declarative imports are
/// handled separately in the traversal driver, since they don't go
/// through a `VariableDeclarator` at all.
pub fn recognize_variable_declarator<'a>(
    declarator: &VariableDeclarator<'a>,
    scope: &Scope,
) -> Option<RecognizedImport> {
    let init = declarator.init.as_ref()?;
    match init {
        Expression::CallExpression(call) => {
            require_call_module_literal(&call.callee, &call.arguments)
                .map(RecognizedImport::Module)
        }
        Expression::NewExpression(new) => {
            require_call_module_literal(&new.callee, &new.arguments).map(RecognizedImport::Module)
        }
        Expression::ImportExpression(import_expr) => {
            dynamic_import_module_literal(&import_expr.source).map(RecognizedImport::Module)
        }
        Expression::Identifier(ident) => scope
            .lookup_module_ref(ident.name.as_str())
            .map(RecognizedImport::Module),
        _ => None,
    }
}
