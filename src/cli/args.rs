//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sqlplay - SQL code generation playground
///
/// Builds generated code from a query and configuration, caching every
/// result under a content fingerprint.
#[derive(Parser, Debug)]
#[command(name = "sqlplay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SQLPLAY_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP playground server
    Serve(ServeArgs),

    /// Build a query once and print the response JSON
    Build(InputArgs),

    /// Print the fingerprint of a query and configuration
    Fingerprint(InputArgs),

    /// Inspect cached workspaces
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides server.bind)
    #[arg(short, long, env = "SQLPLAY_BIND")]
    pub bind: Option<String>,

    /// Port to listen on all interfaces, when no address is given
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Workspace root directory (overrides cache.root)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Query and configuration inputs
#[derive(Parser, Debug)]
pub struct InputArgs {
    /// SQL file with the schema and queries
    #[arg(short, long)]
    pub query: PathBuf,

    /// Generator configuration file (built-in baseline when omitted)
    #[arg(long = "sqlc-config")]
    pub sqlc_config: Option<PathBuf>,

    /// Workspace root directory (overrides cache.root)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,

    /// Workspace root directory (overrides cache.root)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List all workspaces
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one workspace's state and files
    Show {
        /// Workspace fingerprint (64 hex characters)
        fingerprint: String,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
