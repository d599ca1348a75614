// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lockfile scenarios across the three supported schema versions, plus
//! the two-installed-copies union property and a cyclic dependency graph.

use std::fs;
use std::path::Path;

use guardian_core::deps::build_dependency_map;
use guardian_core::{analyze_package_root, AnalyzeOptions};

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn lockfile_v1_walks_recursive_dependency_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("package.json"), r#"{"name": "root-pkg", "dependencies": {"a": "*"}}"#);
    write(
        &root.join("package-lock.json"),
        r#"{
            "lockfileVersion": 1,
            "dependencies": {
                "a": { "version": "1.0.0", "requires": { "b": "*" } },
                "b": { "version": "1.0.0" }
            }
        }"#,
    );
    fs::create_dir_all(root.join("node_modules/a")).unwrap();
    fs::create_dir_all(root.join("node_modules/b")).unwrap();

    let map = build_dependency_map(root).unwrap();
    let a = root.join("node_modules/a");
    let b = root.join("node_modules/b");
    assert_eq!(map.dependencies_of(&a), &[b]);
    assert_eq!(map.dependencies_of(root), &[a]);
}

#[test]
fn lockfile_v3_flat_packages_map_resolves_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("package.json"), r#"{"name": "root-pkg", "dependencies": {"a": "*"}}"#);
    write(
        &root.join("package-lock.json"),
        r#"{
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "root-pkg" },
                "node_modules/a": { "version": "1.0.0", "dependencies": { "b": "*" } },
                "node_modules/b": { "version": "1.0.0" }
            }
        }"#,
    );
    fs::create_dir_all(root.join("node_modules/a")).unwrap();
    fs::create_dir_all(root.join("node_modules/b")).unwrap();

    let map = build_dependency_map(root).unwrap();
    let a = root.join("node_modules/a");
    let b = root.join("node_modules/b");
    assert_eq!(map.dependencies_of(&a), &[b]);
}

#[test]
fn optional_dependency_missing_from_disk_is_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("package.json"), r#"{"name": "root-pkg"}"#);
    write(
        &root.join("package-lock.json"),
        r#"{
            "lockfileVersion": 1,
            "dependencies": {
                "fsevents": { "version": "2.0.0", "optional": true }
            }
        }"#,
    );
    // fsevents' node_modules directory was never installed.
    let map = build_dependency_map(root).unwrap();
    assert!(map.package_paths().all(|p| !p.ends_with("fsevents")));
}

#[test]
fn two_installed_copies_of_same_name_are_unioned_in_the_policy() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("package.json"),
        r#"{"name": "root-pkg", "dependencies": {"a": "*", "b": "*"}}"#,
    );
    write(
        &root.join("package-lock.json"),
        r#"{
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "root-pkg" },
                "node_modules/a": { "version": "1.0.0", "dependencies": { "shared": "*" } },
                "node_modules/a/node_modules/shared": { "version": "2.0.0" },
                "node_modules/b": { "version": "1.0.0", "dependencies": { "shared": "*" } },
                "node_modules/shared": { "version": "1.0.0" }
            }
        }"#,
    );
    fs::create_dir_all(root.join("node_modules/a/node_modules/shared")).unwrap();
    fs::create_dir_all(root.join("node_modules/b")).unwrap();
    fs::create_dir_all(root.join("node_modules/shared")).unwrap();
    write(
        &root.join("node_modules/a/node_modules/shared/index.js"),
        "const fs = require('fs');",
    );
    write(
        &root.join("node_modules/shared/index.js"),
        "const os = require('os');",
    );

    let options = AnalyzeOptions {
        member_access_tracing: false,
        include_non_builtin: true,
    };
    let policy = analyze_package_root(root, &options).unwrap();
    let coarse = &policy.policy_coarse["shared"];
    assert!(coarse.modules.contains(&"fs".to_string()));
    assert!(coarse.modules.contains(&"os".to_string()));
}

#[test]
fn cyclic_dependency_graph_walk_terminates() {
    // Hoisted installs can produce a depends-on-b depends-on-a: both land
    // flat in the root's node_modules and each requires the other.
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("package.json"),
        r#"{"name": "root-pkg", "dependencies": {"a": "*"}}"#,
    );
    write(
        &root.join("package-lock.json"),
        r#"{
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "root-pkg" },
                "node_modules/a": { "version": "1.0.0", "dependencies": { "b": "*" } },
                "node_modules/b": { "version": "1.0.0", "dependencies": { "a": "*" } }
            }
        }"#,
    );
    fs::create_dir_all(root.join("node_modules/a")).unwrap();
    fs::create_dir_all(root.join("node_modules/b")).unwrap();

    let map = build_dependency_map(root).unwrap();
    let a = root.join("node_modules/a");
    let b = root.join("node_modules/b");
    assert_eq!(map.dependencies_of(&a), &[b.clone()]);
    assert_eq!(map.dependencies_of(&b), &[a.clone()]);

    let order = map.walk_iterative(&a);
    assert_eq!(order.len(), 2);
    assert!(order.contains(&a));
    assert!(order.contains(&b));
}
