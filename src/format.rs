//! Output formatting for merged configuration.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::{Map, Value};

/// Output format for rendered configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    #[value(alias = "yml")]
    Yaml,
}

impl OutputFormat {
    /// Render a mapping, always ending with a newline.
    pub fn render(&self, config: &Map<String, Value>) -> Result<String> {
        let mut out = match self {
            OutputFormat::Json => serde_json::to_string_pretty(config)?,
            OutputFormat::Yaml => serde_yaml::to_string(config)?,
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_names_and_alias() {
        assert_eq!(OutputFormat::from_str("json", false), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("yml", false), Ok(OutputFormat::Yaml));
        assert!(OutputFormat::from_str("toml", false).is_err());
    }

    #[test]
    fn test_rendered_output_decodes_back() {
        let Value::Object(config) = json!({"db": {"host": "h1", "port": 2}, "tags": ["c"]}) else {
            unreachable!()
        };

        for format in [OutputFormat::Json, OutputFormat::Yaml] {
            let rendered = format.render(&config).unwrap();
            assert!(rendered.ends_with('\n'));
            let decoded: Value = serde_yaml::from_str(&rendered).unwrap();
            assert_eq!(decoded, Value::Object(config.clone()));
        }
    }
}
