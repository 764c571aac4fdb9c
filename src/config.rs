// repo-pretrain/src/config.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_CLONE_DEPTH: u32 = 1;

/// Everything the reader needs: where the repositories come from and which files count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadConfig {
    /// Directory paths and/or `http(s)://` URLs.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Text files listing one directory path or URL per line.
    #[serde(default)]
    pub input_lists: Vec<PathBuf>,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl ReadConfig {
    pub fn trace_loaded(&self) {
        info!(
            inputs_count = self.inputs.len(),
            input_lists_count = self.input_lists.len(),
            include_patterns = ?self.include_patterns,
            exclude_patterns = ?self.exclude_patterns,
            "Loaded ReadConfig"
        );
        debug!(?self, "ReadConfig loaded (full debug)");
    }
}

/// Tuning for the default ingester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Files above this size (bytes) are listed but their content is skipped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// `--depth` passed to `git clone` for remote repositories.
    #[serde(default = "default_clone_depth")]
    pub clone_depth: u32,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_clone_depth() -> u32 {
    DEFAULT_CLONE_DEPTH
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            clone_depth: DEFAULT_CLONE_DEPTH,
        }
    }
}
