//! Build submission and retrieval
//!
//! Ties the fingerprinter, workspace store, runner and assembler into the
//! two operations the HTTP front and the CLI expose: submit-and-build and
//! fetch-by-fingerprint.

use crate::build::{
    read_inputs, read_outputs, BuildLocks, BuildResponse, BuildRunner, CommandGenerator,
};
use crate::cache::{Fingerprint, WorkspaceState, WorkspaceStore};
use crate::config::{Config, ConfigManager};
use crate::error::{PlayError, PlayResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration used when a request does not carry one
pub const BASELINE_CONFIG: &str = r#"{
  "version": "1",
  "packages": [
    {
      "path": "db",
      "engine": "postgresql",
      "schema": "query.sql",
      "queries": "query.sql"
    }
  ]
}"#;

/// Body of a build submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub config: Option<String>,
}

impl BuildRequest {
    /// Request using the baseline configuration
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            config: None,
        }
    }

    /// Attach an explicit configuration
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// The effective configuration text; empty counts as absent
    pub fn effective_config(&self) -> &str {
        match self.config.as_deref() {
            Some(config) if !config.is_empty() => config,
            _ => BASELINE_CONFIG,
        }
    }

    /// Fingerprint of the effective inputs
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(self.effective_config().as_bytes(), self.query.as_bytes())
    }
}

/// Inputs and outputs of one workspace, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaygroundView {
    pub fingerprint: Fingerprint,
    pub input: BuildResponse,
    pub output: BuildResponse,
}

/// The build cache service
pub struct Playground {
    store: WorkspaceStore,
    runner: BuildRunner,
    locks: BuildLocks,
    artifact_extension: String,
    reuse_succeeded: bool,
}

impl Playground {
    /// Create a service over `store` using `runner`
    pub fn new(store: WorkspaceStore, runner: BuildRunner) -> Self {
        Self {
            store,
            runner,
            locks: BuildLocks::new(),
            artifact_extension: "go".to_string(),
            reuse_succeeded: true,
        }
    }

    /// Create a service backed by the configured external generator
    pub fn from_config(config: &Config) -> Self {
        let generator = CommandGenerator::from_config(&config.generator);
        let runner = BuildRunner::new(Arc::new(generator)).with_timeout(config.generator.timeout());
        let store = WorkspaceStore::new(ConfigManager::workspace_root(config));

        Self::new(store, runner)
            .with_artifact_extension(config.generator.artifact_extension.clone())
            .with_reuse(config.cache.reuse_succeeded)
    }

    /// Extension of files reported as generated output
    pub fn with_artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }

    /// Whether succeeded workspaces are served without regenerating
    pub fn with_reuse(mut self, reuse: bool) -> Self {
        self.reuse_succeeded = reuse;
        self
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn artifact_extension(&self) -> &str {
        &self.artifact_extension
    }

    /// Build `request` (or reuse its cached result) and return the outputs
    pub async fn submit(&self, request: &BuildRequest) -> PlayResult<BuildResponse> {
        if request.query.is_empty() {
            return Err(PlayError::EmptyQuery);
        }

        let fingerprint = request.fingerprint();
        let workspace = self.store.resolve(&fingerprint);
        let _guard = self.locks.acquire(&fingerprint).await;

        let state = workspace.state().await?;
        if self.reuse_succeeded && state == WorkspaceState::Succeeded {
            info!(fingerprint = %fingerprint, "Cache hit");
        } else {
            debug!(fingerprint = %fingerprint, state = %state, "Building");
            workspace.ensure().await?;
            self.runner
                .run(&workspace, request.effective_config(), &request.query)
                .await?;
        }

        read_outputs(&workspace, &self.artifact_extension).await
    }

    /// Read back a workspace by fingerprint
    pub async fn view(&self, fingerprint: &Fingerprint) -> PlayResult<PlaygroundView> {
        let workspace = self.store.resolve(fingerprint);

        Ok(PlaygroundView {
            fingerprint: fingerprint.clone(),
            input: read_inputs(&workspace).await?,
            output: read_outputs(&workspace, &self.artifact_extension).await?,
        })
    }

    /// Current state of a workspace
    pub async fn state(&self, fingerprint: &Fingerprint) -> PlayResult<WorkspaceState> {
        self.store.resolve(fingerprint).state().await
    }
}
