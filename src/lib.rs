//! Layered YAML/JSON Configuration
//!
//! This module exports the resolver, its error types, and the pieces the
//! command-line front end is built from.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod settings;
