//! Generator backed by an external program
//!
//! Runs the configured program (default `sqlc generate`) in a private
//! staging directory seeded with the workspace inputs, then collects
//! every file the program created as an artifact. The workspace itself
//! is never handed to the child process.

use crate::build::generator::{Artifacts, DiagnosticsSink, GenerationError, Generator};
use crate::cache::workspace::{relative_name, walk_files, INPUT_FILES};
use crate::config::schema::GeneratorConfig;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

/// Generator that shells out to a code generation binary
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    /// Create a generator running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Create a generator from configuration
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn stage_inputs(source_dir: &Path, staging: &Path) -> Result<(), GenerationError> {
        for name in INPUT_FILES {
            let from = source_dir.join(name);
            if !from.exists() {
                continue;
            }
            fs::copy(&from, staging.join(name)).await.map_err(|e| {
                GenerationError::failed(format!("staging {}: {}", name, e))
            })?;
        }
        Ok(())
    }

    async fn collect_outputs(staging: &Path) -> Result<Artifacts, GenerationError> {
        let files = walk_files(staging)
            .await
            .map_err(|e| GenerationError::failed(e.to_string()))?;

        let mut artifacts = Artifacts::new();
        for path in files {
            let Some(name) = relative_name(staging, &path) else {
                continue;
            };
            if INPUT_FILES.contains(&name.as_str()) {
                continue;
            }
            let contents = fs::read_to_string(&path)
                .await
                .map_err(|e| GenerationError::failed(format!("{}: {}", name, e)))?;
            artifacts.insert(name, contents);
        }
        Ok(artifacts)
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    async fn generate(
        &self,
        source_dir: &Path,
        diagnostics: &mut DiagnosticsSink,
    ) -> Result<Artifacts, GenerationError> {
        let staging = tempfile::Builder::new()
            .prefix("sqlplay-stage-")
            .tempdir()
            .map_err(|e| GenerationError::failed(format!("creating staging directory: {}", e)))?;

        Self::stage_inputs(source_dir, staging.path()).await?;

        let sink_err = |e: std::io::Error| {
            GenerationError::failed(format!("opening diagnostics log: {}", e))
        };
        let stdout = diagnostics.stdio().map_err(sink_err)?;
        let stderr = diagnostics.stdio().map_err(sink_err)?;

        debug!("Executing: {} in {}", self.command_line(), staging.path().display());

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(staging.path())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| GenerationError::failed(format!("{}: {}", self.program, e)))?;

        if !status.success() {
            return Err(GenerationError::failed(format!(
                "{} exited with {}",
                self.command_line(),
                status
            )));
        }

        Self::collect_outputs(staging.path()).await
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
