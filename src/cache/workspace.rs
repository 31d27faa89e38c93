//! Workspace directories keyed by fingerprint
//!
//! Each fingerprint owns exactly one directory under the store root:
//!
//! ```text
//! <root>/<fingerprint>/
//!     sqlc.json      configuration, verbatim
//!     query.sql      query, verbatim
//!     out.log        diagnostics; non-empty means the build failed
//!     .complete      written once every artifact has landed
//!     <artifacts>    generated files, possibly nested
//! ```

use crate::cache::fingerprint::Fingerprint;
use crate::error::{PlayError, PlayResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File name of the persisted configuration
pub const CONFIG_FILE: &str = "sqlc.json";
/// File name of the persisted query
pub const QUERY_FILE: &str = "query.sql";
/// File name of the diagnostics log
pub const LOG_FILE: &str = "out.log";
/// Marker written after the last artifact of a successful build
pub const COMPLETE_MARKER: &str = ".complete";

/// Input files in the order they are presented back to clients
pub const INPUT_FILES: [&str; 2] = [QUERY_FILE, CONFIG_FILE];

/// Build state of a workspace, derived from what is on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkspaceState {
    /// No directory exists yet
    Empty,
    /// Directory exists with neither a completion marker nor a failure log
    InProgress,
    /// Every artifact was written and the log is empty
    Succeeded,
    /// The log is non-empty
    Failed,
}

impl fmt::Display for WorkspaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Maps fingerprints to directories under a single root
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    /// Create a store rooted at `root` (created lazily)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pure path computation; touches nothing on disk
    pub fn resolve(&self, fingerprint: &Fingerprint) -> Workspace {
        Workspace {
            path: self.root.join(fingerprint.as_str()),
            fingerprint: fingerprint.clone(),
        }
    }

    /// List all workspaces under the root, sorted by fingerprint
    ///
    /// Entries whose names are not valid fingerprints are ignored.
    pub async fn list(&self) -> PlayResult<Vec<Workspace>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut workspaces = vec![];
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            PlayError::io(format!("reading workspace root {}", self.root.display()), e)
        })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PlayError::io("reading workspace entry", e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            // Only canonical lowercase names; anything else was not written by us
            if let Ok(fp) = Fingerprint::parse(name) {
                if fp.as_str() == name {
                    workspaces.push(self.resolve(&fp));
                }
            }
        }

        workspaces.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        Ok(workspaces)
    }
}

/// One fingerprint's directory
#[derive(Debug, Clone)]
pub struct Workspace {
    fingerprint: Fingerprint,
    path: PathBuf,
}

impl Workspace {
    /// Fingerprint this workspace belongs to
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Directory of this workspace
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the diagnostics log
    pub fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE)
    }

    /// Whether the directory has been created
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Create the directory and any missing ancestors; idempotent
    pub async fn ensure(&self) -> PlayResult<()> {
        fs::create_dir_all(&self.path).await.map_err(|e| {
            PlayError::io(format!("creating workspace {}", self.path.display()), e)
        })?;
        debug!("Workspace ready: {}", self.path.display());
        Ok(())
    }

    /// Persist an input file verbatim
    pub async fn write_input(&self, name: &str, contents: &[u8]) -> PlayResult<()> {
        self.write_nested(name, contents).await
    }

    /// Persist a generated artifact, creating parent directories as needed
    pub async fn write_artifact(&self, name: &str, contents: &[u8]) -> PlayResult<()> {
        self.write_nested(name, contents).await
    }

    /// Read the diagnostics log; `None` if absent
    pub async fn read_log(&self) -> PlayResult<Option<String>> {
        read_optional(&self.log_path()).await
    }

    /// Record that every artifact of the current build is on disk
    pub async fn mark_complete(&self) -> PlayResult<()> {
        self.write_nested(COMPLETE_MARKER, b"").await
    }

    /// Drop the completion marker before a rebuild starts
    pub async fn clear_complete(&self) -> PlayResult<()> {
        let marker = self.path.join(COMPLETE_MARKER);
        match fs::remove_file(&marker).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlayError::io(format!("removing {}", marker.display()), e)),
        }
    }

    /// Current state derived from disk
    pub async fn state(&self) -> PlayResult<WorkspaceState> {
        if !self.exists() {
            return Ok(WorkspaceState::Empty);
        }

        if let Some(log) = self.read_log().await? {
            if !log.is_empty() {
                return Ok(WorkspaceState::Failed);
            }
        }

        // Artifacts without the marker are a build that never finished
        if self.path.join(COMPLETE_MARKER).is_file() {
            Ok(WorkspaceState::Succeeded)
        } else {
            Ok(WorkspaceState::InProgress)
        }
    }

    /// Last modification time of the directory, if available
    pub async fn modified(&self) -> Option<DateTime<Utc>> {
        let meta = fs::metadata(&self.path).await.ok()?;
        meta.modified().ok().map(DateTime::<Utc>::from)
    }

    /// Relative paths of all artifacts with the given extension, sorted lexically
    ///
    /// A missing directory yields no artifacts.
    pub async fn artifact_paths(&self, artifact_extension: &str) -> PlayResult<Vec<String>> {
        let mut found = vec![];
        if !self.exists() {
            return Ok(found);
        }

        for path in walk_files(&self.path).await? {
            if path.extension().is_some_and(|ext| ext == artifact_extension) {
                if let Some(name) = relative_name(&self.path, &path) {
                    found.push(name);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    /// Resolve a relative name inside the workspace, rejecting escapes
    pub fn join(&self, name: &str) -> PlayResult<PathBuf> {
        let relative = Path::new(name);
        let clean = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !clean {
            return Err(PlayError::PathInvalid {
                path: relative.to_path_buf(),
                reason: "must be a relative path inside the workspace".to_string(),
            });
        }

        Ok(self.path.join(relative))
    }

    async fn write_nested(&self, name: &str, contents: &[u8]) -> PlayResult<()> {
        let path = self.join(name)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PlayError::io(format!("creating {}", parent.display()), e))?;
        }

        fs::write(&path, contents)
            .await
            .map_err(|e| PlayError::io(format!("writing {}", path.display()), e))?;

        debug!("Wrote {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }
}

/// Recursively collect every regular file under `root`
pub(crate) async fn walk_files(root: &Path) -> PlayResult<Vec<PathBuf>> {
    let mut files = vec![];
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| PlayError::io(format!("reading {}", dir.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PlayError::io(format!("reading entry in {}", dir.display()), e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| PlayError::io(format!("inspecting {}", path.display()), e))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Slash-separated path of `path` relative to `root`
pub(crate) fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Read a file as text, replacing invalid UTF-8
pub(crate) async fn read_lossy(path: &Path) -> PlayResult<String> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| PlayError::io(format!("reading {}", path.display()), e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Like [`read_lossy`], treating "not found" as `None`
pub(crate) async fn read_optional(path: &Path) -> PlayResult<Option<String>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlayError::io(format!("reading {}", path.display()), e)),
    }
}
