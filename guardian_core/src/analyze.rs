// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-level orchestration: drive the dependency mapper, fan per-package
//! analysis out across a `rayon` pool, union results keyed by canonical
//! package name, and produce the final [`Policy`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::ast;
use crate::builtins::{self, BuiltinModules, NodeBuiltinModules};
use crate::deps;
use crate::error::{DependencyMapError, ExtractError};
use crate::policy::{CapabilitySet, Policy};
use crate::traversal;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    pub member_access_tracing: bool,
    pub include_non_builtin: bool,
}

/// Analyze `package_root` and everything its lockfile resolves, and
/// return the merged policy. Per-package and per-file failures are
/// logged and skipped; only a missing/unreadable root manifest or
/// lockfile JSON aborts the whole run.
pub fn analyze_package_root(
    package_root: &Path,
    options: &AnalyzeOptions,
) -> Result<Policy, DependencyMapError> {
    let map = deps::build_dependency_map(package_root)?;

    let paths: Vec<PathBuf> = map.package_paths().cloned().collect();
    let per_path: Vec<(PathBuf, CapabilitySet)> = paths
        .par_iter()
        .map(|path| {
            let span = tracing::debug_span!("analyze_package", path = %path.display());
            let _enter = span.enter();
            (path.clone(), analyze_single_package(path))
        })
        .collect();

    let mut per_name: BTreeMap<String, CapabilitySet> = BTreeMap::new();
    for (path, caps) in per_path {
        let name = map
            .names
            .get(&path)
            .cloned()
            .unwrap_or_else(|| path.display().to_string());
        per_name.entry(name).or_default().union(&caps);
    }

    if !options.include_non_builtin {
        let node_builtins = NodeBuiltinModules;
        for caps in per_name.values_mut() {
            caps.coarse.modules = builtins::filter_to_builtins(&caps.coarse.modules, &node_builtins);
            caps.fine
                .module_members
                .retain(|m| node_builtins.is_builtin(&m.owner));
        }
    }

    Ok(Policy::from_capabilities(options.member_access_tracing, &per_name))
}

fn analyze_single_package(package_dir: &Path) -> CapabilitySet {
    let mut caps = CapabilitySet::default();
    for file in deps::enumerate_source_files(package_dir) {
        if let Err(err) = analyze_single_file(&file, &mut caps) {
            tracing::warn!(path = %file.display(), error = %err, "skipping file");
        }
    }
    caps
}

fn analyze_single_file(path: &Path, caps: &mut CapabilitySet) -> Result<(), ExtractError> {
    let source = std::fs::read_to_string(path).map_err(|source| ExtractError::ReadSource {
        path: path.to_path_buf(),
        source,
    })?;
    let source = ast::strip_shebang(&source);
    let allocator = oxc_allocator::Allocator::default();
    let Some(program) = ast::parse(&allocator, source) else {
        tracing::warn!(path = %path.display(), "parse failed, skipping file");
        return Ok(());
    };
    traversal::analyze_program(&program, path, caps)?;
    Ok(())
}
