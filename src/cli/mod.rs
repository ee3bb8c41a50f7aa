//! CLI command definitions for yaml-layers
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;
pub mod merge;

use check::CheckArgs;
use clap::{Parser, Subcommand};
use merge::MergeArgs;

/// Merge layered YAML/JSON configuration files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge files in order and print the result
    Merge(MergeArgs),

    /// Load and merge files, reporting the first failure
    Check(CheckArgs),
}
