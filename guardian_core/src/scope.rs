// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The lexical scope tree built up during traversal.
//!
//! Mirrors the shape of a real engine's environment records (see the
//! declarative/function/global environment records this crate's
//! teacher engine implements) without any of the runtime-value
//! machinery: a [`Scope`] here only ever holds [`Binding`]s, never
//! values.

use std::cell::RefCell;
use std::rc::Rc;

/// The four scope kinds this crate distinguishes. `Method` is split out
/// from `Function` only so that a future consumer could special-case
/// `super`/`this` binding; nothing here currently treats them
/// differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function,
    Method,
    Block,
}

impl ScopeKind {
    fn is_var_scope(self) -> bool {
        matches!(self, ScopeKind::Program | ScopeKind::Function | ScopeKind::Method)
    }
}

/// A named entity introduced in some lexical scope. `module` starts
/// `None` and is mutated at most once, by the import recognizer, when
/// the binding turns out to reference an imported module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub module: Option<String>,
}

impl Binding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
        }
    }

    pub fn with_module(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: Some(module.into()),
        }
    }
}

#[derive(Debug)]
struct ScopeData {
    kind: ScopeKind,
    parent: Option<Scope>,
    bindings: Vec<Binding>,
}

/// A node in the lexical-scope tree. Cheap to clone (it's a ref-counted
/// handle), so the traversal driver passes the active scope around by
/// value and swaps it out on scope entry/exit rather than mutating
/// through a stack of borrows.
#[derive(Debug, Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

impl Scope {
    pub fn new_root() -> Self {
        Scope(Rc::new(RefCell::new(ScopeData {
            kind: ScopeKind::Program,
            parent: None,
            bindings: Vec::new(),
        })))
    }

    pub fn kind(&self) -> ScopeKind {
        self.0.borrow().kind
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.clone()
    }

    /// Push a new child scope, pre-populated with `initial_bindings`
    /// (used for function/method parameter bindings).
    pub fn push_scope(&self, kind: ScopeKind, initial_bindings: Vec<Binding>) -> Scope {
        Scope(Rc::new(RefCell::new(ScopeData {
            kind,
            parent: Some(self.clone()),
            bindings: initial_bindings,
        })))
    }

    /// Insert `binding` into this scope directly.
    pub fn add_binding(&self, binding: Binding) {
        self.0.borrow_mut().bindings.push(binding);
    }

    /// Insert `binding` into the nearest enclosing Function/Method/Program
    /// scope, walking up through Block scopes as needed. Used for
    /// `var`-kind declarations.
    pub fn add_binding_function_scoped(&self, binding: Binding) {
        let mut cur = self.clone();
        loop {
            if cur.kind().is_var_scope() {
                cur.add_binding(binding);
                return;
            }
            match cur.parent() {
                Some(parent) => cur = parent,
                // A Block scope with no Program ancestor cannot happen in a
                // well-formed tree (the root is always Program), but fail
                // safe rather than panic.
                None => {
                    cur.add_binding(binding);
                    return;
                }
            }
        }
    }

    /// Search this scope then its ancestors for the nearest binding
    /// named `name`.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        let mut cur = Some(self.clone());
        while let Some(scope) = cur {
            let data = scope.0.borrow();
            if let Some(found) = data.bindings.iter().rev().find(|b| b.name == name) {
                return Some(found.clone());
            }
            cur = data.parent.clone();
        }
        None
    }

    /// Like [`Scope::lookup`], but only returns a module-referencing
    /// binding; `lookup_module_ref(n).is_some()` is used by the import
    /// recognizer to test for aliasing.
    pub fn lookup_module_ref(&self, name: &str) -> Option<String> {
        self.lookup(name).and_then(|b| b.module)
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Mutate the nearest binding named `name` to record that it
    /// references `module`. No-op if no such binding exists (callers
    /// are expected to have just declared it).
    pub fn set_module_ref(&self, name: &str, module: impl Into<String>) {
        let module = module.into();
        let mut cur = Some(self.clone());
        while let Some(scope) = cur {
            let mut data = scope.0.borrow_mut();
            if let Some(found) = data.bindings.iter_mut().rev().find(|b| b.name == name) {
                found.module = Some(module);
                return;
            }
            let parent = data.parent.clone();
            drop(data);
            cur = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward_through_ancestors() {
        let root = Scope::new_root();
        root.add_binding(Binding::new("fs"));
        let block = root.push_scope(ScopeKind::Block, Vec::new());
        assert!(block.has_binding("fs"));
        assert!(block.lookup("missing").is_none());
    }

    #[test]
    fn function_scoped_binding_skips_block_scopes() {
        let root = Scope::new_root();
        let func = root.push_scope(ScopeKind::Function, Vec::new());
        let block = func.push_scope(ScopeKind::Block, Vec::new());
        let inner_block = block.push_scope(ScopeKind::Block, Vec::new());

        inner_block.add_binding_function_scoped(Binding::new("x"));

        // Visible from the function scope itself...
        assert!(func.has_binding("x"));
        // ...but was not inserted into either intervening block scope.
        let block_only: Vec<_> = {
            let data = block.0.borrow();
            data.bindings.iter().map(|b| b.name.clone()).collect()
        };
        assert!(block_only.is_empty());
    }

    #[test]
    fn parameter_shadows_outer_binding() {
        let root = Scope::new_root();
        root.add_binding(Binding::with_module("fs", "fs"));
        let func = root.push_scope(ScopeKind::Function, vec![Binding::new("fs")]);
        // Parameter shadows the outer module-referencing binding: the
        // nearest "fs" has no module annotation.
        assert_eq!(func.lookup("fs").unwrap().module, None);
    }

    #[test]
    fn set_module_ref_mutates_nearest_binding_once() {
        let root = Scope::new_root();
        root.add_binding(Binding::new("a"));
        root.set_module_ref("a", "fs");
        assert_eq!(root.lookup_module_ref("a").as_deref(), Some("fs"));
    }

    #[test]
    fn alias_propagates_module_ref() {
        let root = Scope::new_root();
        root.add_binding(Binding::with_module("a", "fs"));
        root.add_binding(Binding::new("b"));
        if let Some(m) = root.lookup_module_ref("a") {
            root.set_module_ref("b", m);
        }
        assert_eq!(root.lookup_module_ref("b").as_deref(), Some("fs"));
    }
}
