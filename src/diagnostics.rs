//! Destinations for the free-form progress text emitted by training.
//!
//! Nothing written to a sink feeds back into the network; a sink can be
//! swapped for [`NullSink`] without changing trained values.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only text destination.
pub trait DiagnosticSink {
    fn append(&mut self, message: &str);

    /// Whether messages are kept at all. Callers may skip building expensive
    /// messages (such as full graph dumps) when this is false.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn append(&mut self, _message: &str) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Forwards each message to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn append(&mut self, message: &str) {
        let message = message.trim();
        if !message.is_empty() {
            log::debug!("{}", message);
        }
    }

    fn is_enabled(&self) -> bool {
        log::log_enabled!(log::Level::Debug)
    }
}

/// Appends to a text file, creating it on first use.
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileSink {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticSink for FileSink {
    fn append(&mut self, message: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(message.as_bytes()));
        if let Err(err) = result {
            log::warn!("failed to append to diagnostic log {}: {}", self.path.display(), err);
        }
    }
}

impl DiagnosticSink for String {
    fn append(&mut self, message: &str) {
        self.push_str(message);
    }
}
