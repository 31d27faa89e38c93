//! CLI command implementations

pub mod build;
pub mod cache;
pub mod config;
pub mod fingerprint;
pub mod serve;

pub use build::execute as build;
pub use cache::execute as cache;
pub use config::execute as config;
pub use fingerprint::execute as fingerprint;
pub use serve::execute as serve;

use crate::cli::args::InputArgs;
use crate::config::Config;
use crate::error::{PlayError, PlayResult};
use crate::playground::BuildRequest;
use std::path::PathBuf;
use tokio::fs;

/// Read the query and optional configuration files into a request
pub(crate) async fn read_request(args: &InputArgs) -> PlayResult<BuildRequest> {
    let query = fs::read_to_string(&args.query)
        .await
        .map_err(|e| PlayError::io(format!("reading query {}", args.query.display()), e))?;

    let mut request = BuildRequest::new(query);
    if let Some(path) = &args.sqlc_config {
        let config = fs::read_to_string(path)
            .await
            .map_err(|e| PlayError::io(format!("reading sqlc config {}", path.display()), e))?;
        request = request.with_config(config);
    }

    Ok(request)
}

/// Apply a `--root` override on top of the loaded configuration
pub(crate) fn with_root(config: &Config, root: Option<PathBuf>) -> Config {
    let mut config = config.clone();
    if root.is_some() {
        config.cache.root = root;
    }
    config
}
