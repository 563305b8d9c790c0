// Configuration for the source emitter

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "calltrace-fmt.json";

/// Emitter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces for indentation
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    #[serde(default)]
    pub brace_style: BraceStyle,
}

/// Brace placement style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BraceStyle {
    /// Same line: `int main() {`
    #[default]
    SameLine,
    /// Next line: `int main()\n{`
    NextLine,
}

fn default_indent_size() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            brace_style: BraceStyle::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from directory (searches parents for calltrace-fmt.json)
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        for candidate in dir.as_ref().ancestors() {
            let config_path = candidate.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::from_file(config_path);
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
