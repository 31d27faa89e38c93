//! Build command - run one build through the cache and print the result

use crate::cli::args::InputArgs;
use crate::cli::commands::{read_request, with_root};
use crate::config::Config;
use crate::error::PlayResult;
use crate::playground::Playground;
use console::style;

/// Execute the build command
pub async fn execute(args: InputArgs, config: &Config) -> PlayResult<()> {
    let request = read_request(&args).await?;
    let playground = Playground::from_config(&with_root(config, args.root));

    let response = playground.submit(&request).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.errored {
        eprintln!("{} generation failed for {}", style("!").red(), response.sha);
    }
    Ok(())
}
