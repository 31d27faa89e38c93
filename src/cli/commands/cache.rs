//! Cache command - inspect cached workspaces

use crate::build::{read_inputs, read_outputs};
use crate::cache::{Fingerprint, WorkspaceState};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::commands::with_root;
use crate::config::Config;
use crate::error::{PlayError, PlayResult};
use crate::playground::Playground;
use chrono::{DateTime, Utc};
use console::style;

/// One row of the workspace listing
#[derive(Debug, serde::Serialize)]
struct WorkspaceRow {
    fingerprint: String,
    state: WorkspaceState,
    modified: Option<DateTime<Utc>>,
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> PlayResult<()> {
    let playground = Playground::from_config(&with_root(config, args.root));

    match args.action {
        CacheAction::List { format } => list_workspaces(&playground, format).await,
        CacheAction::Show { fingerprint } => show_workspace(&playground, &fingerprint).await,
    }
}

async fn list_workspaces(playground: &Playground, format: OutputFormat) -> PlayResult<()> {
    let workspaces = playground.store().list().await?;

    let mut rows = Vec::with_capacity(workspaces.len());
    for workspace in &workspaces {
        rows.push(WorkspaceRow {
            fingerprint: workspace.fingerprint().to_string(),
            state: workspace.state().await?,
            modified: workspace.modified().await,
        });
    }

    match format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.fingerprint);
            }
        }
    }

    Ok(())
}

fn print_table(rows: &[WorkspaceRow]) {
    if rows.is_empty() {
        println!("No cached workspaces found.");
        return;
    }

    println!("{:<66} {:<12} {:<20}", "FINGERPRINT", "STATE", "MODIFIED");
    println!("{}", "-".repeat(98));

    for row in rows {
        let state = match row.state {
            WorkspaceState::Succeeded => style("succeeded").green().to_string(),
            WorkspaceState::Failed => style("failed").red().to_string(),
            WorkspaceState::InProgress => style("in-progress").yellow().to_string(),
            WorkspaceState::Empty => style("empty").dim().to_string(),
        };
        let modified = row
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!("{:<66} {:<12} {:<20}", row.fingerprint, state, modified);
    }

    println!();
    println!("Total: {} workspace(s)", rows.len());
}

async fn show_workspace(playground: &Playground, raw: &str) -> PlayResult<()> {
    let fingerprint = Fingerprint::parse(raw)?;
    let workspace = playground.store().resolve(&fingerprint);
    let state = workspace.state().await?;

    if state == WorkspaceState::Empty {
        return Err(PlayError::WorkspaceNotFound(fingerprint.to_string()));
    }

    println!("Workspace: {}", workspace.path().display());
    println!("State:     {}", state);
    println!();

    println!("Inputs:");
    for file in read_inputs(&workspace).await?.files {
        println!("  {} {} ({} bytes)", style("•").cyan(), file.name, file.contents.len());
    }

    let outputs = read_outputs(&workspace, playground.artifact_extension()).await?;
    if outputs.errored {
        println!();
        println!("{}", style("Error log:").red());
        for line in outputs.error.lines() {
            println!("  {}", line);
        }
        return Ok(());
    }

    println!("Artifacts:");
    for file in outputs.files {
        println!("  {} {} [{}]", style("•").green(), file.name, file.content_type);
    }

    Ok(())
}
