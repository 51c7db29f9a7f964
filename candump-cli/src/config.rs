//! Run configuration loading (TOML)
//!
//! An alternative to command-line flags for scripted runs: the same inputs
//! and outputs, read from a config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// candump log file to decode
    pub log: PathBuf,
    /// DBC files providing the message layouts
    pub dbc_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Wide CSV output path
    #[serde(default = "default_csv")]
    pub csv: PathBuf,
    /// Optional JSON statistics snapshot
    #[serde(default)]
    pub stats_json: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: default_csv(),
            stats_json: None,
        }
    }
}

fn default_csv() -> PathBuf {
    PathBuf::from("decoded.csv")
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.input.dbc_files.is_empty() {
        anyhow::bail!("config {:?} lists no DBC files", path);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            log = "trace.log"
            dbc_files = ["powertrain.dbc", "body.dbc"]

            [output]
            csv = "out.csv"
            stats_json = "stats.json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.log, PathBuf::from("trace.log"));
        assert_eq!(config.input.dbc_files.len(), 2);
        assert_eq!(config.output.csv, PathBuf::from("out.csv"));
        assert_eq!(config.output.stats_json, Some(PathBuf::from("stats.json")));
    }

    #[test]
    fn test_output_section_is_optional() {
        let toml_content = r#"
            [input]
            log = "trace.log"
            dbc_files = ["powertrain.dbc"]
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.output.csv, PathBuf::from("decoded.csv"));
        assert!(config.output.stats_json.is_none());
    }
}
