//! Source specification: which files to merge, in what order, and how often.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reload policy applied when no declaration sets one.
pub const DEFAULT_RELOAD: bool = true;

fn default_required() -> bool {
    true
}

fn default_reload() -> bool {
    DEFAULT_RELOAD
}

/// One entry of the ordered file list.
///
/// Deserializes from either a bare path string or a table:
///
/// ```yaml
/// - base.yaml
/// - path: local.yaml
///   required: false
/// - path: shared.json
///   subpath: $.services.api
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FileSpecRepr")]
pub struct FileSpec {
    pub path: PathBuf,
    /// Narrow the decoded document to this location before merging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    /// A missing required file fails resolution; a missing optional one is skipped.
    pub required: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileSpecRepr {
    Path(PathBuf),
    Table {
        path: PathBuf,
        #[serde(default)]
        subpath: Option<String>,
        #[serde(default = "default_required")]
        required: bool,
    },
}

impl From<FileSpecRepr> for FileSpec {
    fn from(repr: FileSpecRepr) -> Self {
        match repr {
            FileSpecRepr::Path(path) => FileSpec::new(path),
            FileSpecRepr::Table {
                path,
                subpath,
                required,
            } => FileSpec {
                path,
                subpath,
                required,
            },
        }
    }
}

impl FileSpec {
    /// A required file with no subpath.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            subpath: None,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_subpath(mut self, subpath: impl Into<String>) -> Self {
        self.subpath = Some(subpath.into());
        self
    }
}

impl From<PathBuf> for FileSpec {
    fn from(path: PathBuf) -> Self {
        FileSpec::new(path)
    }
}

impl From<&Path> for FileSpec {
    fn from(path: &Path) -> Self {
        FileSpec::new(path)
    }
}

impl From<&str> for FileSpec {
    fn from(path: &str) -> Self {
        FileSpec::new(path)
    }
}

impl From<String> for FileSpec {
    fn from(path: String) -> Self {
        FileSpec::new(path)
    }
}

/// Ordered file list plus reload policy.
///
/// Equal specs are the same identity for caching purposes, see
/// [`Resolver::shared`](super::Resolver::shared).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Files in ascending precedence: later entries override earlier ones.
    pub files: Vec<FileSpec>,
    /// Re-read every file on every resolution instead of caching the first result.
    #[serde(default = "default_reload")]
    pub reload: bool,
}

impl SourceSpec {
    pub fn new<I, F>(files: I, reload: bool) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FileSpec>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            reload,
        }
    }
}

/// A parsed subpath expression.
///
/// Two syntaxes are accepted: a JSON pointer (`/services/api/0`) and a
/// JSONPath-style expression without wildcards (`$.services.api[0]`,
/// `services.api`, `$['key with spaces']`). `$` alone selects the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subpath {
    expr: String,
    kind: SubpathKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubpathKind {
    Pointer,
    Segments(Vec<Segment>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

impl Subpath {
    pub fn parse(expr: &str) -> Result<Self, String> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err("subpath cannot be empty".to_string());
        }

        let kind = if trimmed.starts_with('/') {
            SubpathKind::Pointer
        } else {
            SubpathKind::Segments(parse_segments(trimmed)?)
        };

        Ok(Self {
            expr: trimmed.to_string(),
            kind,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// Take the value at this subpath out of `value`, or `None` if absent.
    pub fn extract(&self, mut value: Value) -> Option<Value> {
        match &self.kind {
            SubpathKind::Pointer => value.pointer_mut(&self.expr).map(Value::take),
            SubpathKind::Segments(segments) => {
                for segment in segments {
                    value = match (segment, value) {
                        (Segment::Key(key), Value::Object(mut map)) => map.remove(key)?,
                        (Segment::Index(index), Value::Array(mut items)) => {
                            if *index >= items.len() {
                                return None;
                            }
                            items.swap_remove(*index)
                        }
                        _ => return None,
                    };
                }
                Some(value)
            }
        }
    }
}

fn parse_segments(expr: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = if chars.first() == Some(&'$') {
        1
    } else {
        // Bare leading key: `a.b` is `$.a.b`.
        let (key, next) = read_key(&chars, 0)?;
        segments.push(Segment::Key(key));
        next
    };

    while i < chars.len() {
        match chars[i] {
            '.' => {
                let (key, next) = read_key(&chars, i + 1)?;
                segments.push(Segment::Key(key));
                i = next;
            }
            '[' => {
                let (segment, next) = read_bracket(&chars, i + 1)?;
                segments.push(segment);
                i = next;
            }
            other => return Err(format!("unexpected character `{other}` at offset {i}")),
        }
    }

    Ok(segments)
}

fn read_key(chars: &[char], start: usize) -> Result<(String, usize), String> {
    let mut end = start;
    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
        end += 1;
    }
    let key: String = chars[start..end].iter().collect();
    if key.is_empty() {
        return Err(format!("empty key at offset {start}"));
    }
    if key == "*" {
        return Err("wildcards are not supported".to_string());
    }
    Ok((key, end))
}

fn read_bracket(chars: &[char], start: usize) -> Result<(Segment, usize), String> {
    match chars.get(start) {
        Some(&quote @ ('\'' | '"')) => {
            let mut end = start + 1;
            while end < chars.len() && chars[end] != quote {
                end += 1;
            }
            if chars.get(end + 1) != Some(&']') {
                return Err(format!("unterminated quoted key at offset {start}"));
            }
            let key: String = chars[start + 1..end].iter().collect();
            Ok((Segment::Key(key), end + 2))
        }
        Some(_) => {
            let mut end = start;
            while end < chars.len() && chars[end] != ']' {
                end += 1;
            }
            if end >= chars.len() {
                return Err(format!("unterminated `[` at offset {}", start - 1));
            }
            let raw: String = chars[start..end].iter().collect();
            if raw == "*" {
                return Err("wildcards are not supported".to_string());
            }
            let index = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("`{raw}` is not a sequence index"))?;
            Ok((Segment::Index(index), end + 1))
        }
        None => Err(format!("unterminated `[` at offset {}", start - 1)),
    }
}
