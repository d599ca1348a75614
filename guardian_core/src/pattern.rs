// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural helpers over `BindingPattern`: flattening a destructuring
//! target down to the identifiers it binds, and enumerating its
//! top-level `(key, sub-pattern)` entries for the member-access tracer.

use std::path::Path;

use oxc_ast::ast::{BindingPattern, BindingPatternKind, PropertyKey};

use crate::error::PatternError;

/// Reduce any binding target to the flat set of identifiers it
/// introduces, recursing through destructuring. Any pattern shape not
/// covered here is a hard error, since it denotes an AST shape this
/// crate's data model does not account for.
pub fn collect_bound_identifiers<'a>(
    pattern: &'a BindingPattern<'a>,
    path: &Path,
    out: &mut Vec<&'a str>,
) -> Result<(), PatternError> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => {
            out.push(id.name.as_str());
            Ok(())
        }
        BindingPatternKind::AssignmentPattern(assign) => {
            collect_bound_identifiers(&assign.left, path, out)
        }
        BindingPatternKind::ObjectPattern(obj) => {
            for prop in &obj.properties {
                collect_bound_identifiers(&prop.value, path, out)?;
            }
            if let Some(rest) = &obj.rest {
                collect_bound_identifiers(&rest.argument, path, out)?;
            }
            Ok(())
        }
        BindingPatternKind::ArrayPattern(arr) => {
            for element in arr.elements.iter().flatten() {
                collect_bound_identifiers(element, path, out)?;
            }
            if let Some(rest) = &arr.rest {
                collect_bound_identifiers(&rest.argument, path, out)?;
            }
            Ok(())
        }
    }
}

/// The static name of a property key, when it has one. Computed keys
/// whose expression isn't a literal aren't statically known and are
/// reported as `None` rather than an error: a hard error is only
/// warranted for *shapes* (property vs. rest) this module doesn't
/// model, not for keys it simply can't statically resolve.
pub fn static_property_key_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        PropertyKey::NumericLiteral(n) => Some(n.value.to_string()),
        _ => None,
    }
}

/// One top-level destructuring entry: either a named object-pattern
/// property, or a positional array-pattern slot. Used by the
/// member-access tracer to pair a destructured name with the owning
/// module/global.
pub enum TopLevelEntry<'a, 'b> {
    Named {
        key: String,
        value: &'b BindingPattern<'a>,
    },
    Indexed {
        index: usize,
        value: &'b BindingPattern<'a>,
    },
}

/// Enumerate the top-level `(key-or-index, sub-pattern)` entries of an
/// object or array pattern, used only when the pattern is the direct
/// target of a `require(...)` call or a module/global-referencing
/// binding. Rest elements are not expanded: a `...rest` slot gathers an
/// unbounded, statically-unknown slice of members, which can't be
/// represented as a single `owner.member` pair.
pub fn top_level_entries<'a, 'b>(pattern: &'b BindingPattern<'a>) -> Vec<TopLevelEntry<'a, 'b>> {
    match &pattern.kind {
        BindingPatternKind::ObjectPattern(obj) => obj
            .properties
            .iter()
            .filter_map(|prop| {
                static_property_key_name(&prop.key).map(|key| TopLevelEntry::Named {
                    key,
                    value: &prop.value,
                })
            })
            .collect(),
        BindingPatternKind::ArrayPattern(arr) => arr
            .elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                element
                    .as_ref()
                    .map(|value| TopLevelEntry::Indexed { index, value })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// The single bound name of a sub-pattern, when it reduces directly to
/// one identifier (the common case: `const { x } = require('m')`).
/// Nested destructuring (`const { x: { y } } = require('m')`) still
/// gets `y` bound into scope via [`collect_bound_identifiers`], but its
/// provenance beyond one level isn't representable in a single
/// `module.member` pair, so no member access is recorded for it.
pub fn as_plain_identifier<'a>(pattern: &BindingPattern<'a>) -> Option<&'a str> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => Some(id.name.as_str()),
        BindingPatternKind::AssignmentPattern(assign) => as_plain_identifier(&assign.left),
        _ => None,
    }
}
