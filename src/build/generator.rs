//! Code generation backend abstraction
//!
//! A generator turns a source directory holding `sqlc.json` and
//! `query.sql` into named text artifacts, or fails. Implementations may
//! write free-form diagnostics to the sink they are handed; anything
//! written there ends up in the workspace log.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;

/// Generated files keyed by relative path
pub type Artifacts = BTreeMap<String, String>;

/// Why a build produced no artifacts
///
/// These are workspace-level outcomes, persisted to the log and reported
/// as `errored: true`. They never fail the request itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The generator reported an ordinary error
    #[error("{0}")]
    Failed(String),

    /// The generator panicked; the panic was contained at the task boundary
    #[error("generation aborted: {0}")]
    Aborted(String),

    /// The generator exceeded its time budget and was cancelled
    #[error("generation timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl GenerationError {
    /// Create an ordinary failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Writable handle to a workspace's diagnostics log
#[derive(Debug)]
pub struct DiagnosticsSink {
    file: File,
}

impl DiagnosticsSink {
    /// Wrap an already-opened log file
    pub fn new(file: File) -> Self {
        Self { file }
    }

    /// Write one line of diagnostics
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{}", line)
    }

    /// Duplicate the handle for use as a child process stdout/stderr
    pub fn stdio(&self) -> io::Result<Stdio> {
        self.file.try_clone().map(Stdio::from)
    }
}

impl Write for DiagnosticsSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Abstract code generation interface
///
/// Implementations must be deterministic: identical inputs must yield
/// identical artifacts, since results are cached by input fingerprint.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate artifacts from the inputs in `source_dir`
    async fn generate(
        &self,
        source_dir: &Path,
        diagnostics: &mut DiagnosticsSink,
    ) -> Result<Artifacts, GenerationError>;

    /// Human-readable backend name for logs
    fn name(&self) -> &'static str;
}
