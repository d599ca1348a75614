// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accumulate the specific members of module-referencing bindings (and
//! of globals, via [`crate::globals`]) that are read or destructured.

use oxc_ast::ast::{BindingPattern, Expression, ModuleExportName};

use crate::globals::is_global_reference;
use crate::imports::require_call_module_literal;
use crate::pattern::{top_level_entries, TopLevelEntry};
use crate::policy::CapabilitySet;
use crate::scope::Scope;

/// What a member expression's (or destructured init's) object resolved
/// to, for the purpose of recording a member access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Module(String),
    Global(String),
}

/// Resolve a member expression's `object` sub-expression to the
/// module or global it reads off, if any:
///
/// - `require('m').x` (case 3): object is a direct `require` call.
/// - `v.x` where `v` is module-referencing (case 2), or a global.
pub fn resolve_expression_owner(object: &Expression<'_>, scope: &Scope) -> Option<Owner> {
    match object {
        Expression::CallExpression(call) => {
            require_call_module_literal(&call.callee, &call.arguments).map(Owner::Module)
        }
        Expression::Identifier(ident) => {
            let name = ident.name.as_str();
            if let Some(module) = scope.lookup_module_ref(name) {
                Some(Owner::Module(module))
            } else if is_global_reference(name, scope) {
                Some(Owner::Global(name.to_string()))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Record a member access once its owner has been resolved.
pub fn record_member_access(owner: Owner, member: &str, caps: &mut CapabilitySet) {
    match owner {
        Owner::Module(module) => caps.add_module_member(module, member),
        Owner::Global(global) => caps.add_global_member(global, member),
    }
}

/// `const { x, y } = require('m')` / `const { x, y } = v` where `v` is
/// module-referencing (case 4): record `m.x`, `m.y` (or `m.0`, `m.1`,
/// ... for array patterns). Rest elements are not expanded.
pub fn record_module_destructure(module: &str, pattern: &BindingPattern<'_>, caps: &mut CapabilitySet) {
    for entry in top_level_entries(pattern) {
        match entry {
            TopLevelEntry::Named { key, .. } => caps.add_module_member(module, key),
            TopLevelEntry::Indexed { index, .. } => {
                caps.add_module_member(module, index.to_string())
            }
        }
    }
}

fn module_export_name_str<'a>(name: &'a ModuleExportName<'a>) -> &'a str {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.as_str(),
        ModuleExportName::IdentifierReference(id) => id.name.as_str(),
        ModuleExportName::StringLiteral(lit) => lit.value.as_str(),
    }
}

/// Case 1: a declarative named import specifier with a literal source,
/// e.g. `import { readFile } from 'fs'`, records `fs.readFile`.
pub fn record_import_specifier(
    source: &str,
    imported: &ModuleExportName<'_>,
    caps: &mut CapabilitySet,
) {
    caps.add_module_member(source, module_export_name_str(imported));
}

/// Case 1: a named re-export with a literal source, e.g. `export { x }
/// from 'fs'`, records `fs.x` (the name as bound in the source module,
/// i.e. `local`, not the external `exported` name).
pub fn record_export_specifier(
    source: &str,
    local: &ModuleExportName<'_>,
    caps: &mut CapabilitySet,
) {
    caps.add_module_member(source, module_export_name_str(local));
}
