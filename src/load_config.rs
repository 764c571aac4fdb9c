use crate::config::ReadConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Loads a YAML config file. Missing keys fall back to their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReadConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(e).with_context(|| format!("Failed to read config file {:?}", path_ref));
        }
    };

    // An empty document deserializes to `null`, which we treat as "all defaults".
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(ReadConfig::default());
    }

    let config: ReadConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config.trace_loaded();
    Ok(config)
}

/// Values given on the command line. Empty vectors mean "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub inputs: Vec<String>,
    pub input_lists: Vec<PathBuf>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

/// Merges command-line values into a file config. Each non-empty CLI list replaces
/// the corresponding file list wholesale.
pub fn merge_overrides(mut config: ReadConfig, overrides: CliOverrides) -> ReadConfig {
    if !overrides.inputs.is_empty() {
        config.inputs = overrides.inputs;
    }
    if !overrides.input_lists.is_empty() {
        config.input_lists = overrides.input_lists;
    }
    if !overrides.include_patterns.is_empty() {
        config.include_patterns = overrides.include_patterns;
    }
    if !overrides.exclude_patterns.is_empty() {
        config.exclude_patterns = overrides.exclude_patterns;
    }
    info!(
        inputs_count = config.inputs.len(),
        input_lists_count = config.input_lists.len(),
        "Config merged with command line values"
    );
    config
}
