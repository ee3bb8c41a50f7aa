//! Logging setup.
//!
//! Library code only emits `tracing` events. Binaries install a subscriber
//! with [`init`], choosing the output with the same `--log` values the CLI
//! accepts: `0`/`off`, `1`/`stdout`, `2`/`stderr`, or a file name.
//!
//! Setting `YAML_LAYERS_LOGGER=true` forces debug level, which shows every
//! file as it is loaded or skipped. `RUST_LOG` overrides both.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable that turns on debug logging.
pub const LOGGER_ENV: &str = "YAML_LAYERS_LOGGER";

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn parse(s: &str) -> Self {
        match s {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        }
    }
}

/// Whether `value` (the content of [`LOGGER_ENV`]) requests debug logging.
pub fn forces_debug(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

pub fn env_forces_debug() -> bool {
    forces_debug(std::env::var(LOGGER_ENV).ok().as_deref())
}

/// Pick the maximum level from the CLI flag and environment.
pub fn level(verbose: bool, env_debug: bool) -> Level {
    if verbose || env_debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

fn filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber.
pub fn init(verbose: bool, target: &LogTarget) -> Result<()> {
    let level = level(verbose, env_forces_debug());

    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            // Append mode
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
