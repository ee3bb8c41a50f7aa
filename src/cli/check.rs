//! Check subcommand for the yaml-layers CLI
//!
//! Loads and merges the given files without printing the result, so a
//! broken layer is reported by index and path.

use crate::config::{MergedConfig, Resolver, SourceSpec};
use crate::error::ResolveError;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the check subcommand
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files in ascending precedence
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Resolve the files and return the merged mapping.
pub fn run(args: &CheckArgs) -> Result<MergedConfig, ResolveError> {
    Resolver::new(SourceSpec::new(args.files.iter().cloned(), true)).load()
}

/// One-line summary of a successful check.
pub fn summary(args: &CheckArgs, merged: &MergedConfig) -> String {
    format!(
        "ok: {} file(s) merged, {} top-level key(s)",
        args.files.len(),
        merged.len()
    )
}

/// One-line report of a failed check: the error code, then the message.
pub fn report(err: &ResolveError) -> String {
    format!("{}: {}", err.code(), err)
}
