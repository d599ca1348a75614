// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decide whether an identifier reference denotes an ambient global,
//! and accumulate globals plus their members.
//!
//! A loosely-typed ESTree walker has to tell an `IdentifierReference`
//! apart from an `IdentifierName` (property names, method keys) or a
//! `BindingIdentifier` (parameters, declared names) by inspecting the
//! ancestor stack, since they're all just `Identifier` nodes with a
//! string. `oxc_ast` already makes that distinction at the type level:
//! this module only ever receives strings that came from an
//! `IdentifierReference`, so a property name or parameter can never
//! reach here as a candidate global. Call sites live in
//! [`crate::traversal`]; nothing is re-derived in this module.

use crate::builtins::is_known_global_name;
use crate::pattern::{top_level_entries, TopLevelEntry};
use crate::policy::CapabilitySet;
use crate::scope::Scope;
use oxc_ast::ast::BindingPattern;

/// True if `name` is a free reference to an ambient global in `scope`:
/// a known global name with no shadowing binding anywhere in the
/// environment chain.
pub fn is_global_reference(name: &str, scope: &Scope) -> bool {
    is_known_global_name(name) && !scope.has_binding(name)
}

/// Record a bare global reference, e.g. `console` used as a value.
pub fn observe_identifier_reference(name: &str, scope: &Scope, caps: &mut CapabilitySet) {
    if is_global_reference(name, scope) {
        caps.add_global(name);
    }
}

/// Record `G.member` (or `G["member"]`) once `G` has already passed
/// [`is_global_reference`].
pub fn record_global_member(global: &str, member: &str, caps: &mut CapabilitySet) {
    caps.add_global_member(global, member);
}

/// `const { a, b } = G;` / `const [a, b] = G;` where `G` is a global:
/// record `G.a`, `G.b` (named) or `G.0`, `G.1`, ... (indexed). Rest
/// elements are not expanded, matching the module-destructuring tracer.
pub fn record_global_destructure(global: &str, pattern: &BindingPattern<'_>, caps: &mut CapabilitySet) {
    for entry in top_level_entries(pattern) {
        match entry {
            TopLevelEntry::Named { key, .. } => record_global_member(global, &key, caps),
            TopLevelEntry::Indexed { index, .. } => {
                record_global_member(global, &index.to_string(), caps)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Binding;

    #[test]
    fn console_is_global_when_unbound() {
        let scope = Scope::new_root();
        assert!(is_global_reference("console", &scope));
    }

    #[test]
    fn parameter_named_fs_is_not_a_global() {
        let scope = Scope::new_root();
        let func = scope.push_scope(crate::scope::ScopeKind::Function, vec![Binding::new("console")]);
        assert!(!is_global_reference("console", &func));
    }

    #[test]
    fn unknown_name_is_never_a_global() {
        let scope = Scope::new_root();
        assert!(!is_global_reference("someRandomThing", &scope));
    }
}
