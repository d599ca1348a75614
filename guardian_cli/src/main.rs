// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser as ClapParser;
use guardian_cli as lib;
use guardian_core::{analyze_package_root, AnalyzeOptions};
use tracing_subscriber::EnvFilter;

/// Derive a capability policy for a package and its installed
/// dependencies by statically analyzing their source code.
#[derive(Debug, ClapParser)]
#[command(name = "guardian")]
#[command(about = "Static capability extractor for Node.js packages", long_about = None)]
struct Cli {
    /// Path to the package root to analyze.
    path: PathBuf,

    /// Overwrite the stored policy on disk.
    #[arg(short, long)]
    write: bool,

    /// Include source locations in the AST dump (debug aid).
    #[arg(long)]
    locations: bool,

    /// Enable fine-grained member tracing.
    #[arg(long)]
    fine: bool,

    /// Suppress backup of the previous policy.
    #[arg(long)]
    no_backup: bool,

    /// Include non-builtin modules in the output.
    #[arg(long)]
    include_non_builtin: bool,

    /// Emit the merged policy as JSON to stdout.
    #[arg(long)]
    stdout: bool,

    /// Override the policy file path.
    #[arg(long, default_value = "/tmp/node_policy.json")]
    policy_path: PathBuf,

    /// Raise the logging verbosity.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    if !args.path.exists() {
        eprintln!("error: package root {} does not exist", args.path.display());
        std::process::exit(1);
    }

    if args.locations {
        tracing::debug!("--locations requested; oxc_ast nodes always carry spans");
    }

    let options = AnalyzeOptions {
        member_access_tracing: args.fine,
        include_non_builtin: args.include_non_builtin,
    };
    let policy = analyze_package_root(&args.path, &options)
        .with_context(|| format!("failed to analyze package root {}", args.path.display()))?;

    let previous = lib::read_previous_policy(&args.policy_path);
    let diffs = lib::diff_policies(&previous, &policy);
    lib::print_diff(&diffs);

    if args.stdout {
        println!("{}", serde_json::to_string_pretty(&policy)?);
    }

    if args.write {
        lib::write_policy(&args.policy_path, &policy, args.no_backup)
            .with_context(|| format!("failed to write policy to {}", args.policy_path.display()))?;
        tracing::info!(path = %args.policy_path.display(), "wrote policy");
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
