//! Merge subcommand for the yaml-layers CLI
//!
//! Resolves the given files in order and renders the merged mapping.

use crate::config::{FileSpec, Resolver, SourceSpec};
use crate::format::OutputFormat;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the merge subcommand
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Files in ascending precedence (later files override earlier ones)
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Files merged after FILE..., skipped when missing
    #[arg(long, value_name = "FILE")]
    pub optional: Vec<PathBuf>,

    /// Narrow every file to this subpath before merging (`$.a.b` or `/a/b`)
    #[arg(long, value_name = "EXPR")]
    pub subpath: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl MergeArgs {
    /// Build the source spec these arguments describe.
    pub fn source_spec(&self) -> SourceSpec {
        let required = self.files.iter().cloned().map(FileSpec::new);
        let optional = self
            .optional
            .iter()
            .cloned()
            .map(|path| FileSpec::new(path).optional());

        let files = required
            .chain(optional)
            .map(|file| match &self.subpath {
                Some(subpath) => file.with_subpath(subpath.clone()),
                None => file,
            })
            .collect();

        // A one-shot command never resolves twice.
        SourceSpec {
            files,
            reload: true,
        }
    }
}

/// Run the merge and return the rendered output.
pub fn run(args: &MergeArgs) -> Result<String> {
    let resolver = Resolver::new(args.source_spec());
    let merged = resolver.resolve()?;
    args.format.render(&merged)
}
