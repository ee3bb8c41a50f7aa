//! Structured error types for document loading and resolution.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Document errors
    FileNotFound,
    ParseError,
    SchemaError,
    SubpathNotFound,

    // Source spec errors
    InvalidSubpath,
    EmptySpec,
    MissingFiles,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::SchemaError => "SCHEMA_ERROR",
            ErrorCode::SubpathNotFound => "SUBPATH_NOT_FOUND",
            ErrorCode::InvalidSubpath => "INVALID_SUBPATH",
            ErrorCode::EmptySpec => "EMPTY_SPEC",
            ErrorCode::MissingFiles => "MISSING_FILES",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to turn a single file into a configuration document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} does not exist or is unreadable: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid YAML or JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} must deserialize to a mapping, found {found}", .path.display())]
    Schema { path: PathBuf, found: &'static str },

    #[error("could not find subpath `{subpath}` in {}", .path.display())]
    SubpathNotFound { path: PathBuf, subpath: String },
}

impl LoadError {
    /// The file the failure belongs to.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::FileNotFound { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Schema { path, .. }
            | LoadError::SubpathNotFound { path, .. } => path.as_path(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LoadError::FileNotFound { .. } => ErrorCode::FileNotFound,
            LoadError::Parse { .. } => ErrorCode::ParseError,
            LoadError::Schema { .. } => ErrorCode::SchemaError,
            LoadError::SubpathNotFound { .. } => ErrorCode::SubpathNotFound,
        }
    }
}

/// Failure of a whole resolution pass. No partial result accompanies it.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("source spec lists no files")]
    EmptySpec,

    #[error("file #{index} failed: {source}")]
    Load {
        /// Zero-based position of the failing file in the source list.
        index: usize,
        #[source]
        source: LoadError,
    },

    #[error("file #{index} ({}) has invalid subpath `{subpath}`: {reason}", .path.display())]
    InvalidSubpath {
        index: usize,
        path: PathBuf,
        subpath: String,
        reason: String,
    },
}

impl ResolveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::EmptySpec => ErrorCode::EmptySpec,
            ResolveError::Load { source, .. } => source.code(),
            ResolveError::InvalidSubpath { .. } => ErrorCode::InvalidSubpath,
        }
    }

    /// Position of the offending file, if the failure is tied to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            ResolveError::EmptySpec => None,
            ResolveError::Load { index, .. } | ResolveError::InvalidSubpath { index, .. } => {
                Some(*index)
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolveError::EmptySpec => None,
            ResolveError::Load { source, .. } => Some(source.path()),
            ResolveError::InvalidSubpath { path, .. } => Some(path.as_path()),
        }
    }
}

/// Failure to build a source spec from its declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("no files declared: set `files` on the override or on the defaults")]
    MissingFiles,

    #[error("declared `files` cannot be empty")]
    EmptyFiles,
}

impl SpecError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SpecError::MissingFiles => ErrorCode::MissingFiles,
            SpecError::EmptyFiles => ErrorCode::EmptySpec,
        }
    }
}
