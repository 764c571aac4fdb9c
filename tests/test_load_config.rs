use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use repo_pretrain::config::{IngestConfig, ReadConfig, DEFAULT_CLONE_DEPTH, DEFAULT_MAX_FILE_SIZE};
use repo_pretrain::load_config::{load_config, merge_overrides, CliOverrides};

/// A full config file populates every field.
#[test]
fn test_load_config_full_file() {
    let config_yaml = r#"
inputs:
  - "https://github.com/example/repo.git"
  - ./local/repo
input_lists:
  - repos.txt
include_patterns:
  - "*.rs"
exclude_patterns:
  - "target/*"
  - "*.lock"
ingest:
  max_file_size: 2048
  clone_depth: 5
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(
        config.inputs,
        vec!["https://github.com/example/repo.git", "./local/repo"]
    );
    assert_eq!(config.input_lists, vec![PathBuf::from("repos.txt")]);
    assert_eq!(config.include_patterns, vec!["*.rs"]);
    assert_eq!(config.exclude_patterns, vec!["target/*", "*.lock"]);
    assert_eq!(
        config.ingest,
        IngestConfig {
            max_file_size: 2048,
            clone_depth: 5
        }
    );
}

/// Missing keys fall back to defaults, including inside the ingest section.
#[test]
fn test_load_config_partial_file_uses_defaults() {
    let config_yaml = r#"
inputs: ["https://github.com/example/repo"]
ingest:
  clone_depth: 3
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config.inputs.len(), 1);
    assert!(config.input_lists.is_empty());
    assert!(config.include_patterns.is_empty());
    assert_eq!(config.ingest.clone_depth, 3);
    assert_eq!(config.ingest.max_file_size, DEFAULT_MAX_FILE_SIZE);
}

#[test]
fn test_load_config_empty_file_is_default() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "\n").unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config, ReadConfig::default());
    assert_eq!(config.ingest.clone_depth, DEFAULT_CLONE_DEPTH);
}

#[test]
fn test_load_config_errors() {
    let missing = load_config("/definitely/not/here.yaml");
    assert!(missing.is_err(), "missing file must fail");

    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "inputs: {not: [a, list").unwrap();
    let invalid = load_config(config_file.path());
    assert!(invalid.is_err(), "malformed YAML must fail");
}

#[test]
fn test_cli_values_replace_file_values() {
    let base = ReadConfig {
        inputs: vec!["https://from/file".into()],
        input_lists: vec![PathBuf::from("file-list.txt")],
        include_patterns: vec!["*.md".into()],
        exclude_patterns: vec!["*.lock".into()],
        ingest: IngestConfig {
            max_file_size: 10,
            clone_depth: 2,
        },
    };
    let merged = merge_overrides(
        base,
        CliOverrides {
            inputs: vec!["https://from/cli".into()],
            include_patterns: vec!["*.rs".into(), "*.toml".into()],
            ..CliOverrides::default()
        },
    );

    assert_eq!(merged.inputs, vec!["https://from/cli"]);
    assert_eq!(merged.input_lists, vec![PathBuf::from("file-list.txt")]);
    assert_eq!(merged.include_patterns, vec!["*.rs", "*.toml"]);
    assert_eq!(merged.exclude_patterns, vec!["*.lock"]);
    assert_eq!(merged.ingest.clone_depth, 2);
}
