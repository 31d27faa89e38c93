//! Fingerprint command - compute a cache key without building

use crate::cli::args::InputArgs;
use crate::cli::commands::read_request;
use crate::config::Config;
use crate::error::PlayResult;

/// Execute the fingerprint command
pub async fn execute(args: InputArgs, _config: &Config) -> PlayResult<()> {
    let request = read_request(&args).await?;
    println!("{}", request.fingerprint());
    Ok(())
}
