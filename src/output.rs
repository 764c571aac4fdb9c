//! JSON Lines output for pretraining records, plus the end-of-run report.

use std::io::{self, Write};

use tracing::{error, info};

use crate::contract::{Ingester, PretrainRecord};
use crate::reader::RepositoryPretrainAdapter;

/// Writes one JSON object per record, newline-terminated.
pub struct JsonlWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write_record(&mut self, record: &PretrainRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// What happened to every queued source in one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadReport {
    pub produced: usize,
    pub failed: Vec<String>,
}

/// Drains an initialised adapter into `writer`. Failed sources are logged and counted but
/// never stop the run; only output I/O errors do.
pub fn write_all_records<I, W>(
    adapter: &mut RepositoryPretrainAdapter<I>,
    writer: &mut JsonlWriter<W>,
) -> io::Result<ReadReport>
where
    I: Ingester,
    W: Write,
{
    let mut report = ReadReport::default();
    while !adapter.finished() {
        let Some(outcome) = adapter.produce() else {
            break;
        };
        match outcome.result {
            Ok(record) => {
                writer.write_record(&record)?;
                report.produced += 1;
            }
            Err(e) => {
                error!(source = %outcome.input, error = %e, "Failed to read from: {}", outcome.input);
                report.failed.push(outcome.input);
            }
        }
    }
    info!(
        produced = report.produced,
        failed = report.failed.len(),
        "All queued sources processed"
    );
    Ok(report)
}
