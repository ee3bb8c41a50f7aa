//! Declaring a source spec.
//!
//! A consumer can declare `files` and `reload` in two places: an explicit
//! per-consumer override and a shared default configuration. Each field is
//! taken from the override when it sets one, otherwise from the defaults.
//! This is a field-level pick and never touches document contents.

use super::source::{DEFAULT_RELOAD, FileSpec, SourceSpec};
use crate::error::SpecError;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Optional `files` / `reload` values from one declaration mechanism.
///
/// `files` accepts a single entry or a list, each entry being a path string
/// or a `{path, subpath, required}` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDeclaration {
    #[serde(
        default,
        deserialize_with = "deserialize_files",
        skip_serializing_if = "Option::is_none"
    )]
    pub files: Option<Vec<FileSpec>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload: Option<bool>,
}

fn deserialize_files<'de, D>(deserializer: D) -> Result<Option<Vec<FileSpec>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Files {
        Many(Vec<FileSpec>),
        One(FileSpec),
    }

    Ok(Option::<Files>::deserialize(deserializer)?.map(|files| match files {
        Files::Many(files) => files,
        Files::One(file) => vec![file],
    }))
}

impl SourceDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, F>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FileSpec>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_reload(mut self, reload: bool) -> Self {
        self.reload = Some(reload);
        self
    }
}

impl SourceSpec {
    /// Build a spec from an explicit override and shared defaults.
    ///
    /// `files` must be set by at least one of them and be non-empty.
    /// `reload` falls back to [`DEFAULT_RELOAD`].
    pub fn from_declarations(
        overrides: &SourceDeclaration,
        defaults: &SourceDeclaration,
    ) -> Result<Self, SpecError> {
        let files = match (&overrides.files, &defaults.files) {
            (Some(files), _) => {
                debug!(count = files.len(), "Found `files` on override");
                files.clone()
            }
            (None, Some(files)) => {
                debug!(count = files.len(), "Found `files` on defaults");
                files.clone()
            }
            (None, None) => return Err(SpecError::MissingFiles),
        };

        if files.is_empty() {
            return Err(SpecError::EmptyFiles);
        }

        let reload = match (overrides.reload, defaults.reload) {
            (Some(reload), _) => {
                debug!(reload, "Found `reload` on override");
                reload
            }
            (None, Some(reload)) => {
                debug!(reload, "Found `reload` on defaults");
                reload
            }
            (None, None) => {
                debug!(reload = DEFAULT_RELOAD, "Using default `reload`");
                DEFAULT_RELOAD
            }
        };

        Ok(SourceSpec { files, reload })
    }
}
