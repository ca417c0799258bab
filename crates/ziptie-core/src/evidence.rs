#![forbid(unsafe_code)]

//! JSONL evidence of binding activity.
//!
//! When enabled, the binder writes one JSON object per line for every
//! fastening, snip, and rejected operation. Lines are written in call order
//! behind a mutex, so several binders may share one sink.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::registry::{FastenerInfo, SnipReport};

/// Where evidence lines go.
#[derive(Debug, Clone)]
pub enum EvidenceDestination {
    /// Standard output.
    Stdout,
    /// Append to a file.
    File(PathBuf),
}

/// Evidence sink configuration.
#[derive(Debug, Clone)]
pub struct EvidenceConfig {
    /// Whether evidence is written at all.
    pub enabled: bool,
    /// Output destination.
    pub destination: EvidenceDestination,
    /// Flush after every line.
    pub flush_on_write: bool,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            destination: EvidenceDestination::Stdout,
            flush_on_write: true,
        }
    }
}

impl EvidenceConfig {
    /// Evidence off.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Evidence to stdout.
    #[must_use]
    pub fn enabled_stdout() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Evidence appended to `path`.
    #[must_use]
    pub fn enabled_file(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            destination: EvidenceDestination::File(path.into()),
            flush_on_write: true,
        }
    }

    /// Set flush-on-write behavior.
    #[must_use]
    pub fn with_flush_on_write(mut self, flush: bool) -> Self {
        self.flush_on_write = flush;
        self
    }
}

/// One evidence record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BindingEvent {
    /// A fastening was registered.
    Fasten {
        #[serde(flatten)]
        fastener: FastenerInfo,
        /// Whether a previous entry for the same pair was overwritten.
        replaced: bool,
        /// Whether a reconciliation write was issued.
        reconciled: bool,
    },
    /// A fastening was removed.
    Snip {
        #[serde(flatten)]
        report: SnipReport,
    },
    /// An operation failed.
    Rejected {
        op: &'static str,
        kind: &'static str,
        reason: String,
    },
}

struct SinkInner {
    writer: BufWriter<Box<dyn Write + Send>>,
    flush_on_write: bool,
}

/// Shared JSONL writer.
#[derive(Clone)]
pub struct EvidenceSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl std::fmt::Debug for EvidenceSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceSink").finish_non_exhaustive()
    }
}

impl EvidenceSink {
    /// Open a sink. Returns `Ok(None)` when evidence is disabled.
    pub fn from_config(config: &EvidenceConfig) -> io::Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let writer: Box<dyn Write + Send> = match &config.destination {
            EvidenceDestination::Stdout => Box::new(io::stdout()),
            EvidenceDestination::File(path) => {
                Box::new(OpenOptions::new().create(true).append(true).open(path)?)
            }
        };
        Ok(Some(Self::from_writer(writer, config.flush_on_write)))
    }

    /// Wrap an arbitrary writer.
    #[must_use]
    pub fn from_writer(writer: Box<dyn Write + Send>, flush_on_write: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SinkInner {
                writer: BufWriter::new(writer),
                flush_on_write,
            })),
        }
    }

    /// Serialize and write one record.
    pub fn record(&self, event: &BindingEvent) -> io::Result<()> {
        let line = serde_json::to_string(event).map_err(io::Error::other)?;
        self.write_jsonl(&line)
    }

    /// Write one raw line.
    pub fn write_jsonl(&self, line: &str) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("evidence sink lock poisoned"))?;
        inner.writer.write_all(line.as_bytes())?;
        inner.writer.write_all(b"\n")?;
        if inner.flush_on_write {
            inner.writer.flush()?;
        }
        Ok(())
    }

    /// Flush buffered lines.
    pub fn flush(&self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("evidence sink lock poisoned"))?;
        inner.writer.flush()
    }
}
