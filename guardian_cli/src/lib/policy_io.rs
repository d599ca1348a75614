// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read/write the persisted policy document, with `.old` backups.

use std::path::Path;

use anyhow::Context;
use guardian_core::Policy;

/// Load the policy at `path` to diff against. A missing file, or one
/// that isn't valid JSON matching the documented shape, is treated as
/// an empty policy rather than an error.
pub fn read_previous_policy(path: &Path) -> Policy {
    let Ok(text) = std::fs::read_to_string(path) else {
        return Policy::default();
    };
    serde_json::from_str(&text).unwrap_or_default()
}

/// Write `policy` to `path`, sorted and pretty-printed. Unless
/// `no_backup` is set and a file already exists at `path`, it is copied
/// to `<path>.old` first.
pub fn write_policy(path: &Path, policy: &Policy, no_backup: bool) -> anyhow::Result<()> {
    if !no_backup && path.exists() {
        let backup_path = backup_path_for(path);
        std::fs::copy(path, &backup_path)
            .with_context(|| format!("failed to back up {} to {}", path.display(), backup_path.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create policy file {}", path.display()))?;
    serde_json::to_writer_pretty(file, policy)
        .with_context(|| format!("failed to serialize policy to {}", path.display()))?;
    Ok(())
}

fn backup_path_for(path: &Path) -> std::path::PathBuf {
    let mut os_string = path.as_os_str().to_os_string();
    os_string.push(".old");
    std::path::PathBuf::from(os_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_policy_file_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_policy.json");
        let policy = read_previous_policy(&path);
        assert!(policy.policy_coarse.is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_policy.json");
        let mut per_package = std::collections::BTreeMap::new();
        per_package.insert("left-pad".to_string(), guardian_core::policy::CapabilitySet::default());
        let policy = Policy::from_capabilities(true, &per_package);
        write_policy(&path, &policy, true).unwrap();
        let read_back = read_previous_policy(&path);
        assert_eq!(read_back, policy);
    }

    #[test]
    fn writing_twice_without_no_backup_creates_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_policy.json");
        let policy = Policy::default();
        write_policy(&path, &policy, true).unwrap();
        write_policy(&path, &policy, false).unwrap();
        assert!(backup_path_for(&path).exists());
    }
}
