#![doc = "repo-pretrain: turns git repositories into text records for LLM pretraining."]

//! Each repository (local directory or remote `http(s)://` URL) becomes one
//! [`contract::PretrainRecord`]: the concatenated text of its files, with the summary
//! and directory tree kept as metadata.
//!
//! Start at [`reader::RepositoryPretrainAdapter`]; the binary in `main.rs` wires it to
//! the command line through [`cli::run`].

pub mod cli;
pub mod config;
pub mod contract;
pub mod download;
pub mod ingest;
pub mod load_config;
pub mod output;
pub mod reader;

pub use cli::{run, Cli, Commands};
pub use contract::{Ingested, Ingester, IngestionError, PretrainRecord, RecordMeta};
pub use reader::{accept_input, ReadOutcome, RepositoryPretrainAdapter};
