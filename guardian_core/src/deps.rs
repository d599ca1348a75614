// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The dependency mapper: resolves a package root's lockfile (schema
//! versions 1, 2, and 3) plus its on-disk `node_modules` layout into a
//! `packagePath -> list<packagePath>` mapping, and enumerates each
//! package's source files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::DependencyMapError;

/// The result of mapping one package root's dependency tree: edges
/// between installed package paths, and the canonical name associated
/// with each path (for unioning multiple installed copies of the same
/// name under one policy entry).
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    pub root: PathBuf,
    pub edges: BTreeMap<PathBuf, Vec<PathBuf>>,
    pub names: BTreeMap<PathBuf, String>,
}

impl DependencyMap {
    pub fn package_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.edges.keys()
    }

    pub fn dependencies_of(&self, path: &Path) -> &[PathBuf] {
        self.edges.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterative, cycle-safe walk of the dependency graph starting at
    /// `from`. Hoisted installs can produce cycles (a depends on b
    /// depends on a), so this must never recurse naively.
    pub fn walk_iterative(&self, from: &Path) -> Vec<PathBuf> {
        let mut visited = std::collections::BTreeSet::new();
        let mut stack = vec![from.to_path_buf()];
        let mut order = Vec::new();
        while let Some(path) = stack.pop() {
            if !visited.insert(path.clone()) {
                continue;
            }
            order.push(path.clone());
            for dep in self.dependencies_of(&path) {
                if !visited.contains(dep) {
                    stack.push(dep.clone());
                }
            }
        }
        order
    }
}

fn read_json(path: &Path) -> Result<Value, DependencyMapError> {
    let text = std::fs::read_to_string(path).map_err(|source| DependencyMapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DependencyMapError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

fn find_lockfile(package_root: &Path) -> Option<PathBuf> {
    let shrinkwrap = package_root.join("npm-shrinkwrap.json");
    if shrinkwrap.is_file() {
        return Some(shrinkwrap);
    }
    let package_lock = package_root.join("package-lock.json");
    if package_lock.is_file() {
        return Some(package_lock);
    }
    None
}

fn root_manifest_name(package_root: &Path) -> Result<String, DependencyMapError> {
    let manifest_path = package_root.join("package.json");
    let manifest = read_json(&manifest_path).map_err(|_| {
        DependencyMapError::ManifestMissing(manifest_path.clone())
    })?;
    manifest
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DependencyMapError::ManifestMissing(manifest_path))
}

fn root_manifest_dependencies(package_root: &Path) -> Vec<String> {
    let manifest_path = package_root.join("package.json");
    let Ok(manifest) = read_json(&manifest_path) else {
        return Vec::new();
    };
    manifest
        .get("dependencies")
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}

/// Build the full dependency map for `package_root`. The root manifest
/// and the root lockfile are both required: either missing aborts the
/// run. An unrecognized lockfile schema version is the separate,
/// non-fatal case, and degenerates to root-only analysis instead.
pub fn build_dependency_map(package_root: &Path) -> Result<DependencyMap, DependencyMapError> {
    let root_name = root_manifest_name(package_root)?;
    let mut map = DependencyMap {
        root: package_root.to_path_buf(),
        edges: BTreeMap::new(),
        names: BTreeMap::new(),
    };
    map.names.insert(package_root.to_path_buf(), root_name);

    let lockfile_path = find_lockfile(package_root)
        .ok_or_else(|| DependencyMapError::LockfileMissing(package_root.to_path_buf()))?;
    let lockfile = read_json(&lockfile_path)?;
    let version = lockfile.get("lockfileVersion").and_then(Value::as_i64).unwrap_or(0);

    let root_deps = root_manifest_dependencies(package_root);

    match version {
        1 => {
            let empty = Map::new();
            let top_level = lockfile
                .get("dependencies")
                .and_then(Value::as_object)
                .unwrap_or(&empty);
            let name_map = walk_lockfile_v1_level(package_root, top_level, &[], &mut map);
            let root_edges = root_deps
                .iter()
                .filter_map(|name| name_map.get(name).cloned())
                .collect();
            map.edges.insert(package_root.to_path_buf(), root_edges);
        }
        2 | 3 => {
            let empty = Map::new();
            let packages = lockfile
                .get("packages")
                .and_then(Value::as_object)
                .unwrap_or(&empty);
            walk_lockfile_flat(package_root, packages, &mut map);
            let root_edges = root_deps
                .iter()
                .filter_map(|name| {
                    resolve_flat_dependency("", name, &map, package_root)
                })
                .collect();
            map.edges.insert(package_root.to_path_buf(), root_edges);
        }
        _ => {
            // Unrecognized schema: conservative default, root-only analysis.
            map.edges.insert(package_root.to_path_buf(), Vec::new());
        }
    }

    Ok(map)
}

/// Walk one level of a lockfile-version-1 `dependencies` tree,
/// recording edges into `map` and returning this level's
/// `name -> installed path` table (used both by the caller to resolve
/// its own `requires`, and as the outer scope for recursion).
fn walk_lockfile_v1_level(
    parent_path: &Path,
    level_deps: &Map<String, Value>,
    outer_scopes: &[BTreeMap<String, PathBuf>],
    map: &mut DependencyMap,
) -> BTreeMap<String, PathBuf> {
    let mut name_map = BTreeMap::new();
    let mut kept = Vec::new();
    for (name, value) in level_deps {
        let own_path = parent_path.join("node_modules").join(name);
        let optional = value.get("optional").and_then(Value::as_bool).unwrap_or(false);
        if optional && !own_path.exists() {
            continue;
        }
        name_map.insert(name.clone(), own_path.clone());
        kept.push((name.clone(), value.clone(), own_path));
    }

    for (name, value, own_path) in kept {
        map.names.insert(own_path.clone(), name);

        let nested_map = match value.get("dependencies").and_then(Value::as_object) {
            Some(sub) => {
                let mut new_outer = vec![name_map.clone()];
                new_outer.extend(outer_scopes.iter().cloned());
                walk_lockfile_v1_level(&own_path, sub, &new_outer, map)
            }
            None => BTreeMap::new(),
        };

        let mut dep_edges = Vec::new();
        if let Some(requires) = value.get("requires").and_then(Value::as_object) {
            for req_name in requires.keys() {
                let resolved = nested_map
                    .get(req_name)
                    .or_else(|| name_map.get(req_name))
                    .or_else(|| outer_scopes.iter().find_map(|scope| scope.get(req_name)));
                if let Some(path) = resolved {
                    dep_edges.push(path.clone());
                }
            }
        }
        map.edges.insert(own_path, dep_edges);
    }

    name_map
}

/// Populate `map` from a v2/v3 flat `packages` map. Non-existent
/// installed paths are skipped (optional packages / missing transitive
/// deps the installer didn't satisfy).
fn walk_lockfile_flat(package_root: &Path, packages: &Map<String, Value>, map: &mut DependencyMap) {
    for (key, _value) in packages {
        if key.is_empty() {
            continue; // the root entry; handled separately via package.json
        }
        let path = package_root.join(key);
        if !path.exists() {
            continue;
        }
        map.names.insert(path, flat_key_canonical_name(key));
    }

    for (key, value) in packages {
        if key.is_empty() {
            continue;
        }
        let path = package_root.join(key);
        if !path.exists() {
            continue;
        }
        let mut edges = Vec::new();
        if let Some(deps) = value.get("dependencies").and_then(Value::as_object) {
            for dep_name in deps.keys() {
                if let Some(resolved) = resolve_flat_dependency(key, dep_name, map, package_root) {
                    edges.push(resolved);
                }
            }
        }
        map.edges.insert(path, edges);
    }
}

/// The canonical package name for a flat lockfile relative-path key:
/// the substring after the last `node_modules/` segment, with a
/// leading `@scope/` pulled in as part of the name.
fn flat_key_canonical_name(key: &str) -> String {
    let rest = match key.rfind("node_modules/") {
        Some(idx) => &key[idx + "node_modules/".len()..],
        None => key,
    };
    let mut parts = rest.splitn(3, '/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{scope}/{name}"),
        (Some(first), _) => first.to_string(),
        (None, _) => rest.to_string(),
    }
}

/// Resolve `dep_name` required by the package at flat relative path
/// `own_key`, by walking node_modules resolution up the path: try
/// `own_key/node_modules/dep_name`, then strip one nesting level and
/// retry, down to the root's own `node_modules/dep_name`.
fn resolve_flat_dependency(
    own_key: &str,
    dep_name: &str,
    map: &DependencyMap,
    package_root: &Path,
) -> Option<PathBuf> {
    let mut search = own_key.to_string();
    loop {
        let candidate = if search.is_empty() {
            format!("node_modules/{dep_name}")
        } else {
            format!("{search}/node_modules/{dep_name}")
        };
        let candidate_path = package_root.join(&candidate);
        if map.names.contains_key(&candidate_path) {
            return Some(candidate_path);
        }
        if search.is_empty() {
            return None;
        }
        match search.rfind("/node_modules/") {
            Some(idx) => search.truncate(idx),
            None => search.clear(),
        }
    }
}

/// Recursively list a package's own source files: `.js`/`.mjs`/`.cjs`
/// only, never descending into `node_modules` (that's a different
/// package's source tree) or hidden directories.
pub fn enumerate_source_files(package_dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    enumerate_source_files_into(package_dir, &mut out);
    out
}

fn enumerate_source_files_into(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if name == "node_modules" {
                continue;
            }
            enumerate_source_files_into(&path, out);
        } else if matches!(path.extension().and_then(|e| e.to_str()), Some("js" | "mjs" | "cjs")) {
            out.push(path);
        }
    }
}
