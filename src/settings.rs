//! Settings-source capability.
//!
//! A settings layer asks each of its sources for a mapping and decides how
//! they rank. [`Resolver`] is one such source; [`MapSource`] covers explicit
//! values handed to a constructor. [`SourceChain`] is a minimal priority
//! chain: the first source that has a top-level field decides it.

use crate::config::Resolver;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Anything that can produce a settings mapping on demand.
pub trait SettingsSource: Send + Sync {
    /// Name used in logs and error context.
    fn name(&self) -> String;

    fn load(&self) -> Result<Arc<Map<String, Value>>>;

    /// Value of a single top-level field, if this source has it.
    fn field(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.load()?.get(name).cloned())
    }
}

impl SettingsSource for Resolver {
    fn name(&self) -> String {
        let files: Vec<String> = self
            .spec()
            .files
            .iter()
            .map(|file| file.path.display().to_string())
            .collect();
        format!("files[{}]", files.join(", "))
    }

    fn load(&self) -> Result<Arc<Map<String, Value>>> {
        Ok(self.resolve()?)
    }
}

impl<S: SettingsSource + ?Sized> SettingsSource for Arc<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn load(&self) -> Result<Arc<Map<String, Value>>> {
        (**self).load()
    }
}

/// Fixed values, e.g. arguments given at construction time.
#[derive(Debug, Clone)]
pub struct MapSource {
    name: String,
    values: Arc<Map<String, Value>>,
}

impl MapSource {
    pub fn new(name: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            values: Arc::new(values),
        }
    }
}

impl SettingsSource for MapSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Arc<Map<String, Value>>> {
        Ok(Arc::clone(&self.values))
    }
}

/// Sources in descending priority.
#[derive(Default)]
pub struct SourceChain {
    sources: Vec<Box<dyn SettingsSource>>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source ranked below every source already in the chain.
    pub fn with_source(mut self, source: impl SettingsSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Collect every top-level field from the highest-priority source that has it.
    pub fn collect(&self) -> Result<Map<String, Value>> {
        let mut settings = Map::new();
        for source in &self.sources {
            let values = source
                .load()
                .with_context(|| format!("settings source `{}` failed", source.name()))?;
            for (key, value) in values.iter() {
                if !settings.contains_key(key) {
                    debug!(field = %key, source = %source.name(), "Field resolved");
                    settings.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(settings)
    }

    /// Collect and deserialize into typed settings.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        let settings = self.collect()?;
        serde_json::from_value(Value::Object(settings)).context("failed to deserialize settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSpec;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct DatabaseSettings {
        host: String,
        port: u16,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Settings {
        name: String,
        database: DatabaseSettings,
    }

    #[test]
    fn test_first_source_wins_per_field() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yaml");
        std::fs::write(
            &path,
            "name: from-file\ndatabase:\n  host: db.local\n  port: 5432\n",
        )
        .unwrap();

        let chain = SourceChain::new()
            .with_source(MapSource::new("init", map(json!({"name": "from-init"}))))
            .with_source(Resolver::new(SourceSpec::new([path], false)));

        let settings: Settings = chain.extract().unwrap();
        assert_eq!(
            settings,
            Settings {
                name: "from-init".to_string(),
                database: DatabaseSettings {
                    host: "db.local".to_string(),
                    port: 5432,
                },
            }
        );
    }

    #[test]
    fn test_resolver_field_lookup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"myFirstSetting": 1}"#).unwrap();

        let resolver = Resolver::new(SourceSpec::new([path], true));
        assert_eq!(resolver.field("myFirstSetting").unwrap(), Some(json!(1)));
        assert_eq!(resolver.field("absent").unwrap(), None);
    }

    #[test]
    fn test_failing_source_is_named_in_error() {
        let temp = TempDir::new().unwrap();
        let resolver = Resolver::new(SourceSpec::new([temp.path().join("gone.yaml")], true));
        let chain = SourceChain::new().with_source(resolver);

        let err = chain.collect().unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("gone.yaml"), "{rendered}");
        assert!(rendered.contains("settings source"), "{rendered}");
    }

    #[test]
    fn test_shared_resolver_is_a_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shared.yaml");
        std::fs::write(&path, "a: 1\n").unwrap();

        let shared = Resolver::shared(SourceSpec::new([path], false));
        let chain = SourceChain::new().with_source(Arc::clone(&shared));
        assert_eq!(chain.collect().unwrap()["a"], json!(1));
        assert_eq!(chain.len(), 1);
    }
}
