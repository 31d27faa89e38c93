//! Build execution inside a workspace
//!
//! Persists the inputs, truncates the diagnostics log, and runs the
//! generator on its own task so that a panic or a hang inside generation
//! becomes an ordinary [`GenerationError`] instead of taking the request
//! (or the process) down with it.

use crate::build::generator::{Artifacts, DiagnosticsSink, GenerationError, Generator};
use crate::cache::{Workspace, CONFIG_FILE, QUERY_FILE};
use crate::error::{PlayError, PlayResult};
use std::any::Any;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Result of one build run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Artifact names written to the workspace
    pub written: Vec<String>,
    /// Generation failure, already recorded in the workspace log
    pub error: Option<GenerationError>,
}

impl BuildOutcome {
    /// Whether generation produced artifacts
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs a generator against workspaces
pub struct BuildRunner {
    generator: Arc<dyn Generator>,
    timeout: Option<Duration>,
}

impl BuildRunner {
    /// Create a runner with no time limit
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            timeout: None,
        }
    }

    /// Bound each generation; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one build in `workspace`
    ///
    /// Generation failures are returned inside the outcome. Only I/O
    /// failures on the workspace itself produce `Err`.
    pub async fn run(
        &self,
        workspace: &Workspace,
        config: &str,
        query: &str,
    ) -> PlayResult<BuildOutcome> {
        let fingerprint = workspace.fingerprint();

        workspace.clear_complete().await?;
        workspace.write_input(CONFIG_FILE, config.as_bytes()).await?;
        workspace.write_input(QUERY_FILE, query.as_bytes()).await?;

        // Fresh log on every run: a passing re-run clears an old failure
        let log_path = workspace.log_path();
        let log = File::create(&log_path)
            .await
            .map_err(|e| PlayError::io(format!("creating {}", log_path.display()), e))?
            .into_std()
            .await;

        debug!(
            fingerprint = %fingerprint,
            generator = self.generator.name(),
            "Starting generation"
        );

        match self.generate(workspace, DiagnosticsSink::new(log)).await {
            Ok(artifacts) => {
                let mut written = Vec::with_capacity(artifacts.len());
                for (name, contents) in &artifacts {
                    workspace.write_artifact(name, contents.as_bytes()).await?;
                    written.push(name.clone());
                }
                workspace.mark_complete().await?;

                info!(fingerprint = %fingerprint, artifacts = written.len(), "Build succeeded");
                Ok(BuildOutcome {
                    written,
                    error: None,
                })
            }
            Err(error) => {
                warn!(fingerprint = %fingerprint, error = %error, "Build failed");
                Self::record_failure(workspace, &error).await?;
                Ok(BuildOutcome {
                    written: vec![],
                    error: Some(error),
                })
            }
        }
    }

    /// Invoke the generator behind the task boundary
    async fn generate(
        &self,
        workspace: &Workspace,
        mut sink: DiagnosticsSink,
    ) -> Result<Artifacts, GenerationError> {
        let generator = Arc::clone(&self.generator);
        let source_dir = workspace.path().to_path_buf();

        let mut handle = tokio::spawn(async move {
            let result = generator.generate(&source_dir, &mut sink).await;
            if let Err(e) = sink.flush() {
                warn!("Failed to flush diagnostics: {}", e);
            }
            result
        });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    return Err(GenerationError::TimedOut(limit));
                }
            },
            None => handle.await,
        };

        joined.unwrap_or_else(|e| Err(contain(e)))
    }

    /// Append the failure to the log so readers see the workspace as failed
    async fn record_failure(workspace: &Workspace, error: &GenerationError) -> PlayResult<()> {
        let log_path = workspace.log_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .await
            .map_err(|e| PlayError::io(format!("opening {}", log_path.display()), e))?;

        file.write_all(format!("{}\n", error).as_bytes())
            .await
            .map_err(|e| PlayError::io(format!("writing {}", log_path.display()), e))?;
        file.flush()
            .await
            .map_err(|e| PlayError::io(format!("flushing {}", log_path.display()), e))?;
        Ok(())
    }
}

/// Convert a failed join into a generation error
fn contain(error: JoinError) -> GenerationError {
    if error.is_panic() {
        GenerationError::Aborted(panic_message(error.into_panic()))
    } else {
        GenerationError::Aborted("generation task cancelled".to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
