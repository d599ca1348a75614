// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two static tables the extractor consults: ambient global names,
//! and built-in module specifiers. Both are modeled as opaque string
//! sets supplied by the host platform; this crate's default
//! implementation hardcodes Node's documented lists so the extractor
//! is runnable standalone, but an embedder can substitute its own via
//! [`BuiltinModules`].

use std::collections::BTreeSet;

/// Identifier names this crate treats as ambient globals when no
/// binding shadows them. Node-flavored: the CommonJS module wrapper
/// globals (`require`, `module`, `exports`, `__dirname`, `__filename`)
/// sit alongside the Web-platform-compatible globals Node also exposes.
pub const GLOBAL_NAMES: &[&str] = &[
    "console",
    "process",
    "Buffer",
    "global",
    "globalThis",
    "require",
    "module",
    "exports",
    "__dirname",
    "__filename",
    "setTimeout",
    "clearTimeout",
    "setInterval",
    "clearInterval",
    "setImmediate",
    "clearImmediate",
    "queueMicrotask",
    "structuredClone",
    "performance",
    "URL",
    "URLSearchParams",
    "TextEncoder",
    "TextDecoder",
    "AbortController",
    "AbortSignal",
    "fetch",
    "WebAssembly",
    "crypto",
];

pub fn is_known_global_name(name: &str) -> bool {
    GLOBAL_NAMES.contains(&name)
}

/// The host platform's built-in module introspection API, abstracted
/// as a trait so a caller embedding this crate for a different host
/// (or a future Node release) can supply its own list without forking
/// the extractor. [`NodeBuiltinModules`] is the default, seeded from
/// Node's documented `module.builtinModules`.
pub trait BuiltinModules {
    fn is_builtin(&self, specifier: &str) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NodeBuiltinModules;

/// Node's documented built-in module names, unprefixed. Both `"fs"` and
/// `"node:fs"` are accepted as referring to the same built-in; callers
/// that need to distinguish the two forms should normalize before
/// calling [`BuiltinModules::is_builtin`].
pub const NODE_BUILTIN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

impl BuiltinModules for NodeBuiltinModules {
    fn is_builtin(&self, specifier: &str) -> bool {
        let unprefixed = specifier.strip_prefix("node:").unwrap_or(specifier);
        NODE_BUILTIN_MODULES.contains(&unprefixed)
    }
}

/// Filter `modules` down to those recognized by `builtins`. Used when
/// the CLI's `--include-non-builtin` flag is *not* set (the default).
pub fn filter_to_builtins(
    modules: &BTreeSet<String>,
    builtins: &dyn BuiltinModules,
) -> BTreeSet<String> {
    modules
        .iter()
        .filter(|m| builtins.is_builtin(m))
        .cloned()
        .collect()
}
