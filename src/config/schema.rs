//! Configuration schema for sqlplay
//!
//! Configuration is stored at `~/.config/sqlplay/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Workspace cache settings
    pub cache: CacheConfig,

    /// Code generator settings
    pub generator: GeneratorConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,

    /// HTML template for the playground page (built-in when unset)
    pub template: Option<PathBuf>,

    /// Directory served under /static (disabled when unset)
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &'static str = "127.0.0.1:8086";
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::DEFAULT_BIND.to_string(),
            template: None,
            static_dir: None,
        }
    }
}

/// Workspace cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Workspace root (defaults to the state directory)
    pub root: Option<PathBuf>,

    /// Serve already-succeeded workspaces without regenerating
    pub reuse_succeeded: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            reuse_succeeded: true,
        }
    }
}

/// Code generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Generator executable
    pub program: String,

    /// Arguments passed to the generator
    pub args: Vec<String>,

    /// Per-build time limit in seconds (0 = unlimited)
    pub timeout_secs: u64,

    /// Extension of files reported as generated output
    pub artifact_extension: String,
}

impl GeneratorConfig {
    /// Time limit as a duration, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: "sqlc".to_string(),
            args: vec!["generate".to_string()],
            timeout_secs: 60,
            artifact_extension: "go".to_string(),
        }
    }
}
