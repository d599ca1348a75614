// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compute and print the difference between two policy snapshots.
//! Purely additive printing: never mutates either policy, plain set
//! arithmetic over the sorted `Vec<String>`s already on the wire.

use std::collections::BTreeSet;

use console::style;
use guardian_core::Policy;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SetDiff {
    fn compute(before: &[String], after: &[String]) -> Self {
        let before: BTreeSet<&String> = before.iter().collect();
        let after: BTreeSet<&String> = after.iter().collect();
        Self {
            added: after.difference(&before).map(|s| (*s).clone()).collect(),
            removed: before.difference(&after).map(|s| (*s).clone()).collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageDiff {
    pub modules: SetDiff,
    pub globals: SetDiff,
    pub module_members: SetDiff,
    pub global_members: SetDiff,
}

impl PackageDiff {
    fn is_empty(&self) -> bool {
        self.modules.is_empty()
            && self.globals.is_empty()
            && self.module_members.is_empty()
            && self.global_members.is_empty()
    }
}

/// Diff `previous` against `current`, one entry per package present in
/// either snapshot.
pub fn diff_policies(previous: &Policy, current: &Policy) -> std::collections::BTreeMap<String, PackageDiff> {
    let mut names: BTreeSet<&String> = previous.policy_coarse.keys().collect();
    names.extend(current.policy_coarse.keys());

    let empty_coarse = guardian_core::policy::SerializedCoarse::default();
    let empty_fine = guardian_core::policy::SerializedFine::default();

    names
        .into_iter()
        .map(|name| {
            let prev_coarse = previous.policy_coarse.get(name).unwrap_or(&empty_coarse);
            let cur_coarse = current.policy_coarse.get(name).unwrap_or(&empty_coarse);
            let prev_fine = previous.policy_fine.get(name).unwrap_or(&empty_fine);
            let cur_fine = current.policy_fine.get(name).unwrap_or(&empty_fine);

            let diff = PackageDiff {
                modules: SetDiff::compute(&prev_coarse.modules, &cur_coarse.modules),
                globals: SetDiff::compute(&prev_coarse.globals, &cur_coarse.globals),
                module_members: SetDiff::compute(&prev_fine.modules, &cur_fine.modules),
                global_members: SetDiff::compute(&prev_fine.globals, &cur_fine.globals),
            };
            (name.clone(), diff)
        })
        .collect()
}

/// Print a human-readable diff to stdout, skipping packages with no
/// change.
pub fn print_diff(diffs: &std::collections::BTreeMap<String, PackageDiff>) {
    for (name, diff) in diffs {
        if diff.is_empty() {
            continue;
        }
        println!("{}", style(name).bold());
        print_set_diff("modules", &diff.modules);
        print_set_diff("globals", &diff.globals);
        print_set_diff("module members", &diff.module_members);
        print_set_diff("global members", &diff.global_members);
    }
}

fn print_set_diff(label: &str, diff: &SetDiff) {
    for added in &diff.added {
        println!("  + {} {}", style(label).dim(), style(added).green());
    }
    for removed in &diff.removed {
        println!("  - {} {}", style(label).dim(), style(removed).red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::policy::{CapabilitySet, Policy};
    use std::collections::BTreeMap;

    #[test]
    fn detects_added_module() {
        let before = Policy::default();
        let mut caps = CapabilitySet::default();
        caps.add_module("fs");
        let mut per_package = BTreeMap::new();
        per_package.insert("left-pad".to_string(), caps);
        let after = Policy::from_capabilities(false, &per_package);

        let diffs = diff_policies(&before, &after);
        let pkg_diff = &diffs["left-pad"];
        assert_eq!(pkg_diff.modules.added, vec!["fs".to_string()]);
        assert!(pkg_diff.modules.removed.is_empty());
    }

    #[test]
    fn detects_removed_global() {
        let mut caps = CapabilitySet::default();
        caps.add_global("console");
        let mut per_package = BTreeMap::new();
        per_package.insert("left-pad".to_string(), caps);
        let before = Policy::from_capabilities(false, &per_package);
        let after = Policy::default();

        let diffs = diff_policies(&before, &after);
        let pkg_diff = &diffs["left-pad"];
        assert_eq!(pkg_diff.globals.removed, vec!["console".to_string()]);
    }
}
