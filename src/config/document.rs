//! Document loading.
//!
//! Reads a single file and decodes it with `serde_yaml`. YAML 1.2 is a
//! superset of JSON, so `.json` bodies take the same path and the format is
//! never chosen by extension. Decoded YAML is converted into JSON's data
//! model: merge keys are expanded, and values JSON cannot hold (non-finite
//! floats, null or collection keys, custom tags) are parse errors.

use super::source::Subpath;
use crate::error::LoadError;
use serde_json::{Map, Value};
use std::io;
use std::path::Path;

/// A decoded file: string keys to arbitrary YAML/JSON values.
pub type ConfigDocument = Map<String, Value>;

/// Load `path` and require its root to be a mapping.
pub fn load(path: &Path) -> Result<ConfigDocument, LoadError> {
    load_extracted(path, None)
}

/// Load `path`, optionally narrowing the decoded value to `subpath` before
/// requiring a mapping.
pub fn load_extracted(path: &Path, subpath: Option<&Subpath>) -> Result<ConfigDocument, LoadError> {
    let bytes = read(path)?;
    let value = decode(path, &bytes)?;

    let value = match subpath {
        Some(subpath) => subpath
            .extract(value)
            .ok_or_else(|| LoadError::SubpathNotFound {
                path: path.to_path_buf(),
                subpath: subpath.as_str().to_string(),
            })?,
        None => value,
    };

    into_document(path, value)
}

/// Decode in-memory content as if it had been read from `path`.
pub fn parse(path: &Path, content: &str) -> Result<ConfigDocument, LoadError> {
    let value = decode(path, content.as_bytes())?;
    into_document(path, value)
}

fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    let not_found = |source| LoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(not_found)?;
    if !metadata.is_file() {
        return Err(not_found(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    std::fs::read(path).map_err(not_found)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Value, LoadError> {
    // Empty stream: null root, reported as a schema error by the caller.
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    let parse_error = |source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    // `serde_yaml::Value` rejects duplicate keys and knows about `<<` merge keys.
    let mut yaml = serde_yaml::from_slice::<serde_yaml::Value>(bytes).map_err(parse_error)?;
    yaml.apply_merge().map_err(parse_error)?;

    let mut location = Vec::new();
    yaml_to_json(yaml, &mut location).map_err(|reason| {
        let at = if location.is_empty() {
            "document root".to_string()
        } else {
            format!("`{}`", location.join("."))
        };
        parse_error(serde::de::Error::custom(format!("{reason} at {at}")))
    })
}

/// Convert a decoded YAML value into JSON's data model.
///
/// On failure `location` holds the key path of the offending value.
fn yaml_to_json(value: serde_yaml::Value, location: &mut Vec<String>) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => number_to_json(&n)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                location.push(i.to_string());
                out.push(yaml_to_json(item, location)?);
                location.pop();
            }
            Value::Array(out)
        }
        Yaml::Mapping(mapping) => {
            let mut out = Map::new();
            for (key, item) in mapping {
                let key = key_to_string(key)?;
                location.push(key.clone());
                let item = yaml_to_json(item, location)?;
                location.pop();
                out.insert(key, item);
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => return Err(format!("unsupported tag `{}`", tagged.tag)),
    })
}

fn number_to_json(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(u) = n.as_u64() {
        Ok(Value::from(u))
    } else if let Some(i) = n.as_i64() {
        Ok(Value::from(i))
    } else {
        let f = n.as_f64().unwrap_or(f64::NAN);
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("non-finite float `{n}` cannot be represented"))
    }
}

/// Scalar keys become strings; null and collection keys are rejected.
fn key_to_string(key: serde_yaml::Value) -> Result<String, String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Null => Err("null mapping key".to_string()),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err("non-scalar mapping key".to_string()),
        Yaml::Tagged(tagged) => Err(format!("unsupported tag `{}` on mapping key", tagged.tag)),
    }
}

fn into_document(path: &Path, value: Value) -> Result<ConfigDocument, LoadError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::Schema {
            path: path.to_path_buf(),
            found: kind_name(&other),
        }),
    }
}

/// Human-readable name of a value's kind, used in schema errors.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
