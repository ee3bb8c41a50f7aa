//! yaml-layers
//!
//! Command-line front end for the layered configuration resolver.

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::debug;
use yaml_layers::cli::{Cli, Command, check, merge};
use yaml_layers::logging::{self, LogTarget};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose, &LogTarget::parse(&cli.log))?;

    match cli.command {
        Command::Merge(args) => {
            debug!(files = args.files.len(), format = ?args.format, "Running merge");
            let output = merge::run(&args)?;
            std::io::stdout().write_all(output.as_bytes())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(args) => match check::run(&args) {
            Ok(merged) => {
                println!("{}", check::summary(&args, &merged));
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                eprintln!("{}", check::report(&err));
                Ok(ExitCode::FAILURE)
            }
        },
    }
}
