// Configuration for the instrumentation pass (calltrace.json)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "calltrace.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directive namespace: `#pragma <namespace> debug`
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// How a return value reaches the injected print call
    #[serde(default)]
    pub return_capture: ReturnCapture,

    /// Functions to instrument in addition to those marked by a directive
    #[serde(default)]
    pub targets: Vec<String>,
}

/// How the value of a `return` is handed to the print call placed before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCapture {
    /// The print call references the returned expression itself. An
    /// expression with side effects is evaluated twice.
    #[default]
    Shared,
    /// Impure return values are bound to a local first; the print call and
    /// the return both read the local.
    Temporary,
}

fn default_namespace() -> String {
    "calltrace".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            return_capture: ReturnCapture::default(),
            targets: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Search `dir` and then its ancestors for calltrace.json; defaults when none exists
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        for candidate in dir.as_ref().ancestors() {
            let config_path = candidate.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                log::debug!("loading configuration from {}", config_path.display());
                return Self::from_file(config_path);
            }
        }

        Ok(Self::default())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Default configuration as pretty JSON
    pub fn example() -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&Self::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.namespace, "calltrace");
        assert_eq!(config.return_capture, ReturnCapture::Shared);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{ "return_capture": "temporary" }"#).unwrap();
        assert_eq!(config.namespace, "calltrace");
        assert_eq!(config.return_capture, ReturnCapture::Temporary);
    }

    #[test]
    fn test_example_config() {
        let example = Config::example().unwrap();
        assert!(example.contains("namespace"));
        assert!(example.contains("return_capture"));
        assert!(example.contains("shared"));
    }

    #[test]
    fn test_from_dir_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("src").join("lib");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config {
            namespace: "GCCPLUGIN".to_string(),
            return_capture: ReturnCapture::Temporary,
            targets: vec!["main".to_string()],
        };
        config.save(root.path().join(CONFIG_FILE_NAME)).unwrap();

        assert_eq!(Config::from_dir(&nested).unwrap(), config);
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::from_file(&path), Err(ConfigError::Json(_))));
    }
}
