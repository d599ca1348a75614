// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the core crate. Kept `thiserror`-derived and narrow
//! per concern; the binary crate is the only place these get folded
//! into an `anyhow::Error`.

use std::path::PathBuf;

use thiserror::Error;

/// An AST shape the pattern extractor or destructuring tracer does not
/// model. Treated as a hard, aborting error: silently continuing would
/// understate a package's capabilities.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unsupported binding pattern shape at {path}: {detail}")]
    UnsupportedBindingShape { path: PathBuf, detail: String },
    #[error("unsupported object-pattern property shape at {path}: {detail}")]
    UnsupportedPropertyShape { path: PathBuf, detail: String },
}

#[derive(Debug, Error)]
pub enum DependencyMapError {
    #[error("no lockfile found under {0}")]
    LockfileMissing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lockfile {path} as JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("root package.json missing or unreadable at {0}")]
    ManifestMissing(PathBuf),
}

#[derive(Debug, Error)]
pub enum PolicyIoError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write policy file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize policy: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level error returned by a single package's extraction. Parse
/// failures on individual files are *not* represented here: those are
/// logged and skipped, never propagated.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("failed to read source file {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
