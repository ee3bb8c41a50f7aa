//! Layered configuration resolution.
//!
//! An ordered list of YAML/JSON files is loaded and deep-merged into one
//! mapping, later files overriding earlier ones:
//! - Mappings present in several files merge recursively
//! - Any other value (scalar, sequence, null) replaces the earlier one
//!
//! ## Reload Policy
//! - `reload = true` - every resolution re-reads every file
//! - `reload = false` - the first result is cached for the resolver's lifetime

mod declare;
mod document;
mod merge;
mod resolver;
mod source;

pub use declare::SourceDeclaration;
pub use document::{ConfigDocument, kind_name, load, load_extracted, parse};
pub use merge::{MergedConfig, deep_merge, merge_all, merge_into};
pub use resolver::{ResolveStats, Resolver, load_files};
pub use source::{DEFAULT_RELOAD, FileSpec, SourceSpec, Subpath};
