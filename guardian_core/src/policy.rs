// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The capability data model: per-package coarse/fine sets and the
//! top-level policy document that gets serialized to disk.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single `module.member` or `global.member` access, canonicalized to
/// its textual form by splitting on the right-most dot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberAccess {
    pub owner: String,
    pub member: String,
}

impl MemberAccess {
    pub fn new(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: member.into(),
        }
    }

    pub fn canonical(&self) -> String {
        format!("{}.{}", self.owner, self.member)
    }

    /// Split a canonical `"<owner>.<member>"` string back into its parts,
    /// splitting on the right-most dot (owner names may themselves
    /// contain dots, e.g. scoped packages rendered as `@scope/name`).
    pub fn parse(canonical: &str) -> Option<Self> {
        let idx = canonical.rfind('.')?;
        Some(Self::new(&canonical[..idx], &canonical[idx + 1..]))
    }
}

/// The coarse capability set for one package: which modules it imports
/// and which ambient globals it references.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoarseCapabilities {
    pub modules: BTreeSet<String>,
    pub globals: BTreeSet<String>,
}

/// The fine-grained capability set for one package: the specific
/// members read off modules and globals.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FineCapabilities {
    pub module_members: BTreeSet<MemberAccess>,
    pub global_members: BTreeSet<MemberAccess>,
}

/// The complete, mutable capability accumulator for a single package
/// analysis. `CoarseCapabilities`/`FineCapabilities` are the read-only
/// views serialized into the policy; this type is what the traversal
/// writes into.
#[derive(Debug, Default, Clone)]
pub struct CapabilitySet {
    pub coarse: CoarseCapabilities,
    pub fine: FineCapabilities,
}

impl CapabilitySet {
    pub fn add_module(&mut self, module: impl Into<String>) {
        self.coarse.modules.insert(module.into());
    }

    pub fn add_global(&mut self, global: impl Into<String>) {
        self.coarse.globals.insert(global.into());
    }

    pub fn add_module_member(&mut self, module: impl Into<String>, member: impl Into<String>) {
        let module = module.into();
        self.coarse.modules.insert(module.clone());
        self.fine
            .module_members
            .insert(MemberAccess::new(module, member));
    }

    pub fn add_global_member(&mut self, global: impl Into<String>, member: impl Into<String>) {
        let global = global.into();
        self.coarse.globals.insert(global.clone());
        self.fine
            .global_members
            .insert(MemberAccess::new(global, member));
    }

    /// Union another package copy's capability set into this one.
    /// Used when two installed copies of the same package name exist.
    pub fn union(&mut self, other: &CapabilitySet) {
        self.coarse.modules.extend(other.coarse.modules.iter().cloned());
        self.coarse.globals.extend(other.coarse.globals.iter().cloned());
        self.fine
            .module_members
            .extend(other.fine.module_members.iter().cloned());
        self.fine
            .global_members
            .extend(other.fine.global_members.iter().cloned());
    }

    /// Check the cross-granularity invariants: every fine entry's owner
    /// must be present in the corresponding coarse set.
    pub fn check_invariants(&self) -> bool {
        self.fine
            .module_members
            .iter()
            .all(|m| self.coarse.modules.contains(&m.owner))
            && self
                .fine
                .global_members
                .iter()
                .all(|m| self.coarse.globals.contains(&m.owner))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SerializedCoarse {
    pub modules: Vec<String>,
    pub globals: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SerializedFine {
    pub modules: Vec<String>,
    pub globals: Vec<String>,
}

/// The persisted policy document, matching the on-disk JSON shape
/// described in the CLI surface contract. Keyed by canonical package
/// *name*, not path, so that multiple installed copies are unioned.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    #[serde(rename = "memberAccessTracing")]
    pub member_access_tracing: bool,
    #[serde(rename = "policyCoarse")]
    pub policy_coarse: std::collections::BTreeMap<String, SerializedCoarse>,
    #[serde(rename = "policyFine")]
    pub policy_fine: std::collections::BTreeMap<String, SerializedFine>,
}

impl Policy {
    pub fn from_capabilities(
        member_access_tracing: bool,
        per_package: &std::collections::BTreeMap<String, CapabilitySet>,
    ) -> Self {
        let mut policy_coarse = std::collections::BTreeMap::new();
        let mut policy_fine = std::collections::BTreeMap::new();

        for (name, caps) in per_package {
            debug_assert!(
                caps.check_invariants(),
                "fine capability owner missing from coarse set for package {name}"
            );

            policy_coarse.insert(
                name.clone(),
                SerializedCoarse {
                    modules: caps.coarse.modules.iter().cloned().collect(),
                    globals: caps.coarse.globals.iter().cloned().collect(),
                },
            );

            if member_access_tracing {
                policy_fine.insert(
                    name.clone(),
                    SerializedFine {
                        modules: caps
                            .fine
                            .module_members
                            .iter()
                            .map(MemberAccess::canonical)
                            .collect(),
                        globals: caps
                            .fine
                            .global_members
                            .iter()
                            .map(MemberAccess::canonical)
                            .collect(),
                    },
                );
            }
        }

        Self {
            member_access_tracing,
            policy_coarse,
            policy_fine,
        }
    }
}
