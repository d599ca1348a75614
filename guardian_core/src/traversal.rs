// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The depth-first traversal driver. Dispatches into the scope model,
//! import recognizer, globals extractor, and member-access tracer in a
//! fixed order: scope update, then binding declarations, then import
//! recognition, then globals/member collection (the latter two happen
//! together, as a side effect of generically walking each remaining
//! sub-expression).
//!
//! This driver does not reconstruct an identifier's syntactic role by
//! inspecting a generic ancestor stack at read time. `oxc_ast` already
//! encodes that role in its node *type*: a use that isn't a genuine
//! read (a member expression's non-computed property, a parameter, a
//! method key, a declarator's `id`, a pattern's bound name) is
//! represented by `IdentifierName` or `BindingIdentifier`, never by
//! the `IdentifierReference` that flows into
//! [`Expression::Identifier`]. Call sites below only ever forward an
//! `IdentifierReference`'s name into [`globals::observe_identifier_reference`],
//! so a parameter or property name can never be mistaken for a global
//! reference.

use std::path::Path;

use oxc_ast::ast::{
    Argument, ArrayExpressionElement, AssignmentTarget, BindingPattern, BindingPatternKind,
    ClassElement, Declaration, Expression, ExportDefaultDeclarationKind, ForStatementInit,
    ForStatementLeft, Function, ImportDeclarationSpecifier, MemberExpression, ModuleExportName,
    ObjectPropertyKind, Program, SimpleAssignmentTarget, Statement, VariableDeclaration,
};

use crate::error::PatternError;
use crate::globals;
use crate::imports::{self, RecognizedImport};
use crate::members;
use crate::pattern;
use crate::policy::CapabilitySet;
use crate::scope::{Binding, Scope, ScopeKind};

/// Run the full extraction over one file's parsed program, accumulating
/// into `caps`.
pub fn analyze_program(
    program: &Program<'_>,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    let root = Scope::new_root();
    visit_statements(&program.body, &root, path, caps)
}

fn visit_statements<'a>(
    stmts: &[Statement<'a>],
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    for stmt in stmts {
        visit_statement(stmt, scope, path, caps)?;
    }
    Ok(())
}

fn visit_statement<'a>(
    stmt: &Statement<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    match stmt {
        Statement::ExpressionStatement(s) => visit_expression(&s.expression, scope, path, caps),
        Statement::BlockStatement(s) => {
            let block_scope = scope.push_scope(ScopeKind::Block, Vec::new());
            visit_statements(&s.body, &block_scope, path, caps)
        }
        Statement::VariableDeclaration(decl) => visit_variable_declaration(decl, scope, path, caps),
        Statement::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                scope.add_binding_function_scoped(Binding::new(id.name.as_str()));
            }
            visit_function(func, scope, path, caps, ScopeKind::Function)
        }
        Statement::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                scope.add_binding(Binding::new(id.name.as_str()));
            }
            visit_class(class, scope, path, caps)
        }
        Statement::IfStatement(s) => {
            visit_expression(&s.test, scope, path, caps)?;
            visit_statement(&s.consequent, scope, path, caps)?;
            if let Some(alt) = &s.alternate {
                visit_statement(alt, scope, path, caps)?;
            }
            Ok(())
        }
        Statement::ForStatement(s) => {
            let loop_scope = scope.push_scope(ScopeKind::Block, Vec::new());
            if let Some(init) = &s.init {
                match init {
                    ForStatementInit::VariableDeclaration(decl) => {
                        visit_variable_declaration(decl, &loop_scope, path, caps)?;
                    }
                    other => {
                        if let Some(e) = other.as_expression() {
                            visit_expression(e, &loop_scope, path, caps)?;
                        }
                    }
                }
            }
            if let Some(test) = &s.test {
                visit_expression(test, &loop_scope, path, caps)?;
            }
            if let Some(update) = &s.update {
                visit_expression(update, &loop_scope, path, caps)?;
            }
            visit_statement(&s.body, &loop_scope, path, caps)
        }
        Statement::ForInStatement(s) => {
            let loop_scope = scope.push_scope(ScopeKind::Block, Vec::new());
            bind_for_left(&s.left, &loop_scope, path, caps)?;
            visit_expression(&s.right, &loop_scope, path, caps)?;
            visit_statement(&s.body, &loop_scope, path, caps)
        }
        Statement::ForOfStatement(s) => {
            let loop_scope = scope.push_scope(ScopeKind::Block, Vec::new());
            bind_for_left(&s.left, &loop_scope, path, caps)?;
            visit_expression(&s.right, &loop_scope, path, caps)?;
            visit_statement(&s.body, &loop_scope, path, caps)
        }
        Statement::WhileStatement(s) => {
            visit_expression(&s.test, scope, path, caps)?;
            visit_statement(&s.body, scope, path, caps)
        }
        Statement::DoWhileStatement(s) => {
            visit_statement(&s.body, scope, path, caps)?;
            visit_expression(&s.test, scope, path, caps)
        }
        Statement::ReturnStatement(s) => {
            if let Some(arg) = &s.argument {
                visit_expression(arg, scope, path, caps)?;
            }
            Ok(())
        }
        Statement::ThrowStatement(s) => visit_expression(&s.argument, scope, path, caps),
        Statement::TryStatement(s) => {
            let block_scope = scope.push_scope(ScopeKind::Block, Vec::new());
            visit_statements(&s.block.body, &block_scope, path, caps)?;
            if let Some(handler) = &s.handler {
                let mut bindings = Vec::new();
                if let Some(param) = &handler.param {
                    pattern::collect_bound_identifiers(&param.pattern, path, &mut bindings)
                        .map_err(|e| annotate_path(e, path))?;
                }
                let catch_scope = scope.push_scope(
                    ScopeKind::Block,
                    bindings.into_iter().map(Binding::new).collect(),
                );
                visit_statements(&handler.body.body, &catch_scope, path, caps)?;
            }
            if let Some(finalizer) = &s.finalizer {
                let fin_scope = scope.push_scope(ScopeKind::Block, Vec::new());
                visit_statements(&finalizer.body, &fin_scope, path, caps)?;
            }
            Ok(())
        }
        Statement::SwitchStatement(s) => {
            visit_expression(&s.discriminant, scope, path, caps)?;
            let switch_scope = scope.push_scope(ScopeKind::Block, Vec::new());
            for case in &s.cases {
                if let Some(test) = &case.test {
                    visit_expression(test, &switch_scope, path, caps)?;
                }
                visit_statements(&case.consequent, &switch_scope, path, caps)?;
            }
            Ok(())
        }
        Statement::LabeledStatement(s) => visit_statement(&s.body, scope, path, caps),
        Statement::ImportDeclaration(decl) => {
            let source = decl.source.value.to_string();
            if let Some(specifiers) = &decl.specifiers {
                if specifiers.is_empty() {
                    caps.add_module(source);
                }
                for spec in specifiers {
                    match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            scope.add_binding(Binding::new(s.local.name.as_str()));
                            members::record_import_specifier(&source, &s.imported, caps);
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            caps.add_module(source.clone());
                            scope.add_binding(Binding::with_module(
                                s.local.name.as_str(),
                                source.clone(),
                            ));
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            caps.add_module(source.clone());
                            scope.add_binding(Binding::with_module(
                                s.local.name.as_str(),
                                source.clone(),
                            ));
                        }
                    }
                }
            } else {
                caps.add_module(source);
            }
            Ok(())
        }
        Statement::ExportNamedDeclaration(decl) => {
            if let Some(declaration) = &decl.declaration {
                visit_declaration(declaration, scope, path, caps)?;
            }
            if let Some(source) = &decl.source {
                let source = source.value.to_string();
                caps.add_module(source.clone());
                for spec in &decl.specifiers {
                    members::record_export_specifier(&source, &spec.local, caps);
                }
            } else {
                for spec in &decl.specifiers {
                    if let ModuleExportName::IdentifierReference(ident) = &spec.local {
                        globals::observe_identifier_reference(ident.name.as_str(), scope, caps);
                    }
                }
            }
            Ok(())
        }
        Statement::ExportDefaultDeclaration(decl) => match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                visit_function(func, scope, path, caps, ScopeKind::Function)
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                visit_class(class, scope, path, caps)
            }
            other => {
                if let Some(e) = other.as_expression() {
                    visit_expression(e, scope, path, caps)?;
                }
                Ok(())
            }
        },
        Statement::ExportAllDeclaration(decl) => {
            let source = decl.source.value.to_string();
            tracing::warn!(
                path = %path.display(),
                module = %source,
                "export * from a literal source cannot be enumerated; members unavailable"
            );
            caps.add_module(source);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn bind_for_left<'a>(
    left: &ForStatementLeft<'a>,
    scope: &Scope,
    path: &Path,
    _caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    if let ForStatementLeft::VariableDeclaration(decl) = left {
        for declarator in &decl.declarations {
            let mut names = Vec::new();
            pattern::collect_bound_identifiers(&declarator.id, path, &mut names)
                .map_err(|e| annotate_path(e, path))?;
            for name in names {
                let binding = Binding::new(name);
                if decl.kind.is_var() {
                    scope.add_binding_function_scoped(binding);
                } else {
                    scope.add_binding(binding);
                }
            }
        }
    }
    Ok(())
}

fn visit_variable_declaration<'a>(
    decl: &VariableDeclaration<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    for declarator in &decl.declarations {
        // (1)/(2): scope update + binding declarations.
        let mut names = Vec::new();
        pattern::collect_bound_identifiers(&declarator.id, path, &mut names)
            .map_err(|e| annotate_path(e, path))?;
        for name in &names {
            let binding = Binding::new(*name);
            if decl.kind.is_var() {
                scope.add_binding_function_scoped(binding);
            } else {
                scope.add_binding(binding);
            }
        }

        // (3): import recognition.
        match imports::recognize_variable_declarator(declarator, scope) {
            Some(RecognizedImport::Module(module)) => {
                caps.add_module(module.clone());
                match pattern::as_plain_identifier(&declarator.id) {
                    Some(name) => scope.set_module_ref(name, module),
                    None => members::record_module_destructure(&module, &declarator.id, caps),
                }
            }
            None => {
                if pattern::as_plain_identifier(&declarator.id).is_none() {
                    if let Some(Expression::Identifier(ident)) = declarator.init.as_ref() {
                        if globals::is_global_reference(ident.name.as_str(), scope) {
                            globals::record_global_destructure(
                                ident.name.as_str(),
                                &declarator.id,
                                caps,
                            );
                        }
                    }
                }
            }
        }

        // (4)/(5): globals + member-access collection, via the
        // generic expression walk over the initializer.
        if let Some(init) = &declarator.init {
            visit_expression(init, scope, path, caps)?;
        }
    }
    Ok(())
}

fn visit_declaration<'a>(
    declaration: &Declaration<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    match declaration {
        Declaration::VariableDeclaration(decl) => visit_variable_declaration(decl, scope, path, caps),
        Declaration::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                scope.add_binding_function_scoped(Binding::new(id.name.as_str()));
            }
            visit_function(func, scope, path, caps, ScopeKind::Function)
        }
        Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                scope.add_binding(Binding::new(id.name.as_str()));
            }
            visit_class(class, scope, path, caps)
        }
        _ => Ok(()),
    }
}

fn visit_function<'a>(
    func: &Function<'a>,
    parent_scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
    kind: ScopeKind,
) -> Result<(), PatternError> {
    let mut param_names = Vec::new();
    for param in &func.params.items {
        pattern::collect_bound_identifiers(&param.pattern, path, &mut param_names)
            .map_err(|e| annotate_path(e, path))?;
    }
    if let Some(rest) = &func.params.rest {
        pattern::collect_bound_identifiers(&rest.argument, path, &mut param_names)
            .map_err(|e| annotate_path(e, path))?;
    }
    let initial_bindings = param_names.into_iter().map(Binding::new).collect();
    let func_scope = parent_scope.push_scope(kind, initial_bindings);

    for param in &func.params.items {
        visit_binding_pattern_defaults(&param.pattern, &func_scope, path, caps)?;
    }

    if let Some(body) = &func.body {
        visit_statements(&body.statements, &func_scope, path, caps)?;
    }
    Ok(())
}

fn visit_binding_pattern_defaults<'a>(
    pattern: &BindingPattern<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(_) => Ok(()),
        BindingPatternKind::AssignmentPattern(a) => {
            visit_binding_pattern_defaults(&a.left, scope, path, caps)?;
            visit_expression(&a.right, scope, path, caps)
        }
        BindingPatternKind::ObjectPattern(o) => {
            for prop in &o.properties {
                if prop.computed {
                    if let Some(e) = prop.key.as_expression() {
                        visit_expression(e, scope, path, caps)?;
                    }
                }
                visit_binding_pattern_defaults(&prop.value, scope, path, caps)?;
            }
            if let Some(rest) = &o.rest {
                visit_binding_pattern_defaults(&rest.argument, scope, path, caps)?;
            }
            Ok(())
        }
        BindingPatternKind::ArrayPattern(a) => {
            for element in a.elements.iter().flatten() {
                visit_binding_pattern_defaults(element, scope, path, caps)?;
            }
            if let Some(rest) = &a.rest {
                visit_binding_pattern_defaults(&rest.argument, scope, path, caps)?;
            }
            Ok(())
        }
    }
}

fn visit_class<'a>(
    class: &oxc_ast::ast::Class<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    if let Some(superclass) = &class.super_class {
        visit_expression(superclass, scope, path, caps)?;
    }
    for element in &class.body.body {
        match element {
            ClassElement::MethodDefinition(m) => {
                if m.computed {
                    if let Some(e) = m.key.as_expression() {
                        visit_expression(e, scope, path, caps)?;
                    }
                }
                visit_function(&m.value, scope, path, caps, ScopeKind::Method)?;
            }
            ClassElement::PropertyDefinition(p) => {
                if p.computed {
                    if let Some(e) = p.key.as_expression() {
                        visit_expression(e, scope, path, caps)?;
                    }
                }
                if let Some(value) = &p.value {
                    visit_expression(value, scope, path, caps)?;
                }
            }
            ClassElement::StaticBlock(block) => {
                let block_scope = scope.push_scope(ScopeKind::Block, Vec::new());
                visit_statements(&block.body, &block_scope, path, caps)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn visit_expression<'a>(
    expr: &Expression<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    match expr {
        Expression::Identifier(ident) => {
            globals::observe_identifier_reference(ident.name.as_str(), scope, caps);
            Ok(())
        }
        Expression::StaticMemberExpression(e) => {
            visit_expression(&e.object, scope, path, caps)?;
            if let Some(owner) = members::resolve_expression_owner(&e.object, scope) {
                members::record_member_access(owner, e.property.name.as_str(), caps);
            }
            Ok(())
        }
        Expression::ComputedMemberExpression(e) => {
            visit_expression(&e.object, scope, path, caps)?;
            visit_expression(&e.expression, scope, path, caps)?;
            if let Some(member) = literal_member_name(&e.expression) {
                if let Some(owner) = members::resolve_expression_owner(&e.object, scope) {
                    members::record_member_access(owner, member, caps);
                }
            }
            Ok(())
        }
        Expression::CallExpression(call) => {
            if imports::require_call_module_literal(&call.callee, &call.arguments).is_none() {
                visit_expression(&call.callee, scope, path, caps)?;
            }
            for arg in &call.arguments {
                visit_argument(arg, scope, path, caps)?;
            }
            Ok(())
        }
        Expression::NewExpression(call) => {
            if imports::require_call_module_literal(&call.callee, &call.arguments).is_none() {
                visit_expression(&call.callee, scope, path, caps)?;
            }
            for arg in &call.arguments {
                visit_argument(arg, scope, path, caps)?;
            }
            Ok(())
        }
        Expression::ObjectExpression(obj) => {
            for prop in &obj.properties {
                match prop {
                    ObjectPropertyKind::ObjectProperty(p) => {
                        if p.computed {
                            if let Some(key_expr) = p.key.as_expression() {
                                visit_expression(key_expr, scope, path, caps)?;
                            }
                        }
                        visit_expression(&p.value, scope, path, caps)?;
                    }
                    ObjectPropertyKind::SpreadProperty(s) => {
                        visit_expression(&s.argument, scope, path, caps)?;
                    }
                }
            }
            Ok(())
        }
        Expression::ArrayExpression(arr) => {
            for element in &arr.elements {
                match element {
                    ArrayExpressionElement::SpreadElement(s) => {
                        visit_expression(&s.argument, scope, path, caps)?;
                    }
                    ArrayExpressionElement::Elision(_) => {}
                    other => {
                        if let Some(e) = other.as_expression() {
                            visit_expression(e, scope, path, caps)?;
                        }
                    }
                }
            }
            Ok(())
        }
        Expression::ArrowFunctionExpression(arrow) => {
            let mut param_names = Vec::new();
            for param in &arrow.params.items {
                pattern::collect_bound_identifiers(&param.pattern, path, &mut param_names)
                    .map_err(|e| annotate_path(e, path))?;
            }
            if let Some(rest) = &arrow.params.rest {
                pattern::collect_bound_identifiers(&rest.argument, path, &mut param_names)
                    .map_err(|e| annotate_path(e, path))?;
            }
            let initial = param_names.into_iter().map(Binding::new).collect();
            let arrow_scope = scope.push_scope(ScopeKind::Function, initial);
            visit_statements(&arrow.body.statements, &arrow_scope, path, caps)
        }
        Expression::FunctionExpression(func) => visit_function(func, scope, path, caps, ScopeKind::Function),
        Expression::ClassExpression(class) => visit_class(class, scope, path, caps),
        Expression::AssignmentExpression(e) => {
            visit_assignment_target(&e.left, scope, path, caps)?;
            visit_expression(&e.right, scope, path, caps)
        }
        Expression::BinaryExpression(e) => {
            visit_expression(&e.left, scope, path, caps)?;
            visit_expression(&e.right, scope, path, caps)
        }
        Expression::LogicalExpression(e) => {
            visit_expression(&e.left, scope, path, caps)?;
            visit_expression(&e.right, scope, path, caps)
        }
        Expression::ConditionalExpression(e) => {
            visit_expression(&e.test, scope, path, caps)?;
            visit_expression(&e.consequent, scope, path, caps)?;
            visit_expression(&e.alternate, scope, path, caps)
        }
        Expression::UnaryExpression(e) => visit_expression(&e.argument, scope, path, caps),
        Expression::SequenceExpression(e) => {
            for sub in &e.expressions {
                visit_expression(sub, scope, path, caps)?;
            }
            Ok(())
        }
        Expression::TemplateLiteral(e) => {
            for sub in &e.expressions {
                visit_expression(sub, scope, path, caps)?;
            }
            Ok(())
        }
        Expression::TaggedTemplateExpression(e) => {
            visit_expression(&e.tag, scope, path, caps)?;
            for sub in &e.quasi.expressions {
                visit_expression(sub, scope, path, caps)?;
            }
            Ok(())
        }
        Expression::ParenthesizedExpression(e) => visit_expression(&e.expression, scope, path, caps),
        Expression::AwaitExpression(e) => visit_expression(&e.argument, scope, path, caps),
        Expression::YieldExpression(e) => {
            if let Some(arg) = &e.argument {
                visit_expression(arg, scope, path, caps)?;
            }
            Ok(())
        }
        Expression::ImportExpression(e) => visit_expression(&e.source, scope, path, caps),
        _ => Ok(()),
    }
}

fn visit_argument<'a>(
    arg: &Argument<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    match arg {
        Argument::SpreadElement(s) => visit_expression(&s.argument, scope, path, caps),
        other => {
            if let Some(e) = other.as_expression() {
                visit_expression(e, scope, path, caps)?;
            }
            Ok(())
        }
    }
}

fn visit_assignment_target<'a>(
    target: &AssignmentTarget<'a>,
    scope: &Scope,
    path: &Path,
    caps: &mut CapabilitySet,
) -> Result<(), PatternError> {
    // Destructuring assignment targets (`({x} = require('fs'))`) are not
    // modeled: module/global destructuring is only recognized through
    // `VariableDeclarator`/import forms, never a bare assignment
    // expression.
    let Some(simple) = target.as_simple_assignment_target() else {
        return Ok(());
    };
    match simple {
        SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) => {
            globals::observe_identifier_reference(ident.name.as_str(), scope, caps);
            Ok(())
        }
        other => {
            let Some(member) = other.as_member_expression() else {
                return Ok(());
            };
            match member {
                MemberExpression::StaticMemberExpression(e) => {
                    visit_expression(&e.object, scope, path, caps)?;
                    if let Some(owner) = members::resolve_expression_owner(&e.object, scope) {
                        members::record_member_access(owner, e.property.name.as_str(), caps);
                    }
                    Ok(())
                }
                MemberExpression::ComputedMemberExpression(e) => {
                    visit_expression(&e.object, scope, path, caps)?;
                    visit_expression(&e.expression, scope, path, caps)?;
                    if let Some(member) = literal_member_name(&e.expression) {
                        if let Some(owner) = members::resolve_expression_owner(&e.object, scope) {
                            members::record_member_access(owner, member, caps);
                        }
                    }
                    Ok(())
                }
                MemberExpression::PrivateFieldExpression(_) => Ok(()),
            }
        }
    }
}

fn literal_member_name(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::StringLiteral(s) => Some(s.value.to_string()),
        Expression::NumericLiteral(n) => Some(n.value.to_string()),
        _ => None,
    }
}

fn annotate_path(err: PatternError, path: &Path) -> PatternError {
    match err {
        PatternError::UnsupportedBindingShape { detail, .. } => PatternError::UnsupportedBindingShape {
            path: path.to_path_buf(),
            detail,
        },
        PatternError::UnsupportedPropertyShape { detail, .. } => {
            PatternError::UnsupportedPropertyShape {
                path: path.to_path_buf(),
                detail,
            }
        }
    }
}
