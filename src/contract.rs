//! # contract: data types and the ingestion seam
//!
//! This module defines the [`Ingester`] trait together with the plain data types
//! that flow between ingestion and the pretraining reader:
//!
//! - [`Ingested`]: the summary/tree/content triple returned by one ingestion.
//! - [`PretrainRecord`] and [`RecordMeta`]: the unit of output handed downstream.
//! - [`IngestionError`]: everything that can go wrong while reading one repository.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so the reader can be driven with
//!   deterministic ingestion results (see `MockIngester`).
//!
//! ## Adding New Ingesters
//! - Implement [`Ingester`] and pass it to [`crate::reader::RepositoryPretrainAdapter::with_ingester`].
//! - Map every upstream failure onto an [`IngestionError`] variant; never panic.

use std::fmt;
use std::sync::OnceLock;

use mockall::automock;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Result of ingesting a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    /// Human-readable summary (repository name, file count).
    pub summary: String,
    /// Textual directory tree of the included files.
    pub tree: String,
    /// Concatenated text of all included files.
    pub content: String,
}

/// Metadata attached to each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Identifier derived from the repository string, safe for use as a file name.
    pub file: String,
    /// The repository path or URL exactly as it was queued.
    pub repository: String,
    pub summary: String,
    pub tree: String,
}

/// One pretraining record: the aggregated repository text plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PretrainRecord {
    pub content: String,
    pub meta: RecordMeta,
}

impl PretrainRecord {
    /// Wraps an ingestion result for `repository` into a record.
    pub fn from_ingested(repository: &str, ingested: Ingested) -> Self {
        PretrainRecord {
            content: ingested.content,
            meta: RecordMeta {
                file: sanitize_identifier(repository),
                repository: repository.to_string(),
                summary: ingested.summary,
                tree: ingested.tree,
            },
        }
    }
}

/// Replaces every run of non-alphanumeric characters with a single `_`.
pub fn sanitize_identifier(source: &str) -> String {
    static NON_ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALPHANUMERIC
        .get_or_init(|| Regex::new("[^0-9a-zA-Z]+").expect("literal pattern compiles"));
    re.replace_all(source, "_").into_owned()
}

#[derive(Debug)]
pub enum IngestionError {
    Io(std::io::Error),
    /// `git clone` could not be launched or exited with a failure status.
    GitClone { url: String, message: String },
    /// An include or exclude pattern is not a valid glob.
    Pattern { pattern: String, message: String },
    Walk(String),
    NotADirectory(String),
}

impl fmt::Display for IngestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionError::Io(e) => write!(f, "I/O error: {e}"),
            IngestionError::GitClone { url, message } => {
                write!(f, "failed to clone {url}: {message}")
            }
            IngestionError::Pattern { pattern, message } => {
                write!(f, "invalid pattern {pattern:?}: {message}")
            }
            IngestionError::Walk(msg) => write!(f, "failed to walk repository: {msg}"),
            IngestionError::NotADirectory(path) => write!(f, "not a directory: {path}"),
        }
    }
}

impl std::error::Error for IngestionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IngestionError {
    fn from(e: std::io::Error) -> Self {
        IngestionError::Io(e)
    }
}

/// Turns one repository (local directory or remote URL) into summary, tree and content.
///
/// Include patterns restrict which files contribute (all files when empty);
/// exclude patterns remove files (none when empty).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Ingester {
    fn ingest(
        &self,
        source: &str,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Ingested, IngestionError>;
}
