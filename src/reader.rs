//! Repository pretraining reader: queue of validated repository sources → one record per source.
//!
//! The reader is driven from the outside. After [`RepositoryPretrainAdapter::initialize`]
//! the caller repeatedly pulls items until [`RepositoryPretrainAdapter::finished`] reports
//! true:
//!   - [`RepositoryPretrainAdapter::produce`] pops the next source, ingests it and returns a
//!     [`ReadOutcome`] carrying the source together with the ingestion `Result`
//!   - [`RepositoryPretrainAdapter::read`] applies the absorb-and-continue policy on top:
//!     a failed source is logged and surfaces as `None`
//!   - the adapter is also an [`Iterator`] over [`ReadOutcome`]s
//!
//! # Error Handling
//! Ingestion errors never abort the run; one bad repository contributes nothing and the
//! queue still advances past it. Malformed entries in the configuration are dropped by
//! [`accept_input`] instead of being reported.
//!
//! # Concurrency
//! Single-threaded: every pulling method takes `&mut self`. Ingestion blocks for its full
//! duration (including network I/O for remote clones).

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::config::ReadConfig;
use crate::contract::{Ingester, IngestionError, PretrainRecord};
use crate::download::is_remote;
use crate::ingest::DefaultIngester;

/// Whether `resource` is worth queueing: a non-blank `http(s)://` URL, or an existing directory.
pub fn accept_input(resource: &str) -> bool {
    let resource = resource.trim();
    if resource.is_empty() {
        return false;
    }
    if is_remote(resource) {
        return true;
    }
    Path::new(resource).is_dir()
}

/// One consumed queue entry: which source was read and what came of it.
#[derive(Debug)]
pub struct ReadOutcome {
    pub input: String,
    pub result: Result<PretrainRecord, IngestionError>,
}

pub struct RepositoryPretrainAdapter<I = DefaultIngester> {
    config: ReadConfig,
    ingester: I,
    inputs: VecDeque<String>,
}

impl RepositoryPretrainAdapter<DefaultIngester> {
    /// Adapter backed by the default ingester, tuned by `config.ingest`.
    pub fn new(config: ReadConfig) -> Self {
        let ingester = DefaultIngester::new(config.ingest.clone());
        Self::with_ingester(config, ingester)
    }
}

impl<I: Ingester> RepositoryPretrainAdapter<I> {
    /// Stores the configuration as given. Nothing is validated until [`Self::initialize`].
    pub fn with_ingester(config: ReadConfig, ingester: I) -> Self {
        Self {
            config,
            ingester,
            inputs: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &ReadConfig {
        &self.config
    }

    /// Rebuilds the input queue: accepted direct inputs first, then accepted lines of each
    /// list file, in configuration order.
    pub fn initialize(&mut self) {
        let mut inputs = VecDeque::new();

        for source in &self.config.inputs {
            push_if_accepted(&mut inputs, source);
        }

        for list in &self.config.input_lists {
            match fs::read_to_string(list) {
                Ok(text) => {
                    debug!(list = %list.display(), "Reading input list");
                    for line in text.lines() {
                        push_if_accepted(&mut inputs, line);
                    }
                }
                Err(e) => {
                    warn!(list = %list.display(), error = %e, "Failed to read input list, skipping");
                }
            }
        }

        info!(queued = inputs.len(), "Initialised input queue");
        self.inputs = inputs;
    }

    /// Sources still waiting to be read, front first.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(String::as_str)
    }

    /// True once every queued source has been consumed.
    pub fn finished(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Consumes the next queued source and ingests it. Returns `None` when the queue is empty;
    /// callers are expected to check [`Self::finished`] first.
    pub fn produce(&mut self) -> Option<ReadOutcome> {
        let input = self.inputs.pop_front()?;
        info!(source = %input, "Reading from: {}", input);

        let result = self
            .ingester
            .ingest(
                &input,
                &self.config.include_patterns,
                &self.config.exclude_patterns,
            )
            .map(|ingested| PretrainRecord::from_ingested(&input, ingested));

        Some(ReadOutcome { input, result })
    }

    /// Like [`Self::produce`], but a failed source is logged and yields `None`.
    pub fn read(&mut self) -> Option<PretrainRecord> {
        let outcome = self.produce()?;
        match outcome.result {
            Ok(record) => Some(record),
            Err(e) => {
                error!(source = %outcome.input, error = %e, "Failed to read from: {}", outcome.input);
                None
            }
        }
    }
}

impl<I: Ingester> Iterator for RepositoryPretrainAdapter<I> {
    type Item = ReadOutcome;

    fn next(&mut self) -> Option<ReadOutcome> {
        self.produce()
    }
}

fn push_if_accepted(inputs: &mut VecDeque<String>, candidate: &str) {
    if accept_input(candidate) {
        inputs.push_back(candidate.trim().to_string());
    } else {
        debug!(candidate = %candidate, "Rejected input");
    }
}
