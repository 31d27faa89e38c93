//! Error types for sqlplay
//!
//! All modules use `PlayResult<T>` as their return type. Generation
//! failures are deliberately not part of this enum: they belong to a
//! workspace and are reported through [`crate::build::GenerationError`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sqlplay operations
pub type PlayResult<T> = Result<T, PlayError>;

/// All request-level and host-level errors
#[derive(Error, Debug)]
pub enum PlayError {
    // Request errors
    #[error("empty query")]
    EmptyQuery,

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Invalid SHA: {0}")]
    InvalidFingerprint(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load page template {path}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Workspace errors
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl PlayError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the error was caused by a malformed request rather than the host
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyQuery | Self::InvalidRequest(_) | Self::InvalidFingerprint(_)
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyQuery => Some("Pass a non-empty SQL file with --query"),
            Self::InvalidFingerprint(_) => {
                Some("Fingerprints are 64 hex characters, as printed by `sqlplay fingerprint`")
            }
            Self::ConfigInvalid { .. } => Some("Run: sqlplay config init --force"),
            _ => None,
        }
    }
}
