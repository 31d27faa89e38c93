//! Serve command - run the HTTP playground

use crate::cli::args::ServeArgs;
use crate::cli::commands::with_root;
use crate::config::Config;
use crate::error::PlayResult;
use crate::server;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: &Config) -> PlayResult<()> {
    let bind = resolve_bind(&args, config);
    let config = with_root(config, args.root);
    server::serve(&config, &bind).await
}

/// Explicit address, then `PORT` on all interfaces, then the config
fn resolve_bind(args: &ServeArgs, config: &Config) -> String {
    match (&args.bind, args.port) {
        (Some(bind), _) => bind.clone(),
        (None, Some(port)) => format!("0.0.0.0:{}", port),
        (None, None) => config.server.bind.clone(),
    }
}
