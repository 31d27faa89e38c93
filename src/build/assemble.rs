//! Reading workspaces back into responses
//!
//! Both readers are best-effort snapshots of what is on disk. They never
//! modify the workspace.

use crate::cache::workspace::{read_lossy, read_optional};
use crate::cache::{Fingerprint, Workspace, INPUT_FILES};
use crate::error::PlayResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One file returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub name: String,
    pub contents: String,
    pub content_type: String,
}

impl Artifact {
    /// Build an artifact, inferring the content type from `name`
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            content_type: content_type_for(&name),
            name,
            contents: contents.into(),
        }
    }
}

/// Wire shape of a build result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResponse {
    pub errored: bool,
    pub error: String,
    pub sha: String,
    pub files: Vec<Artifact>,
}

impl BuildResponse {
    /// A failed build carrying the log contents
    pub fn failed(fingerprint: &Fingerprint, log: impl Into<String>) -> Self {
        Self {
            errored: true,
            error: log.into(),
            sha: fingerprint.to_string(),
            files: vec![],
        }
    }
}

/// `text/x-<extension>`, e.g. `text/x-go` for `db/models.go`
pub fn content_type_for(name: &str) -> String {
    let ext = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("text/x-{}", ext)
}

/// Collect generated output from a workspace
///
/// A non-empty log short-circuits to an errored response without scanning
/// for artifacts. A workspace that does not exist reads as empty.
pub async fn read_outputs(
    workspace: &Workspace,
    artifact_extension: &str,
) -> PlayResult<BuildResponse> {
    if let Some(log) = workspace.read_log().await? {
        if !log.is_empty() {
            return Ok(BuildResponse::failed(workspace.fingerprint(), log));
        }
    }

    let mut response = BuildResponse {
        sha: workspace.fingerprint().to_string(),
        ..BuildResponse::default()
    };

    for name in workspace.artifact_paths(artifact_extension).await? {
        let contents = read_lossy(&workspace.join(&name)?).await?;
        response.files.push(Artifact::new(name, contents));
    }

    Ok(response)
}

/// Collect the persisted inputs; missing files are skipped
pub async fn read_inputs(workspace: &Workspace) -> PlayResult<BuildResponse> {
    let mut response = BuildResponse {
        sha: workspace.fingerprint().to_string(),
        ..BuildResponse::default()
    };

    for name in INPUT_FILES {
        if let Some(contents) = read_optional(&workspace.path().join(name)).await? {
            response.files.push(Artifact::new(name, contents));
        }
    }

    Ok(response)
}
