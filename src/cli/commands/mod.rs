//! CLI argument definitions and dispatch.
//!
//! Each command lives in its own submodule:
//! - `index`: the default action, one indexing run
//! - `list`: print what is stored
//! - `setup`: write a starter config file

mod index;
mod list;
mod setup;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::db;

pub use index::cmd_index;
pub use list::cmd_list;
pub use setup::cmd_init_config;

/// Index local music directories into a SQLite library
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub index: IndexArgs,

    /// Config file (default: OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log every processed file (wins over --quiet)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Flags for the default indexing run
#[derive(Args, Debug, Clone, Default)]
pub struct IndexArgs {
    /// Fetch artist pictures, album covers and release dates from Last.fm
    #[arg(long)]
    pub lastfm: bool,

    /// Store file paths only, without reading tags (disables --lastfm)
    #[arg(long)]
    pub nometadata: bool,

    /// Last.fm API key (overrides the config file)
    #[arg(long, env = "LASTFM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List all tracks in the database
    List,
    /// Write a default config file
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Default `tracing` directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "music_indexer=debug"
        } else if self.quiet {
            "music_indexer=error"
        } else {
            "music_indexer=info"
        }
    }
}

/// Run the requested command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::InitConfig { force }) => cmd_init_config(cli.config.as_ref(), *force),
        Some(Commands::List) => {
            let rt = Runtime::new()?;
            let config = load_config(cli)?;
            cmd_list(&rt, &db_url(cli, &config))
        }
        None => {
            let rt = Runtime::new()?;
            let config = load_config(cli)?;
            cmd_index(&rt, &cli.index, &config, &db_url(cli, &config))
        }
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// An explicit `--config` must load; the default location falls back to
/// defaults.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    for warning in config.startup_warnings() {
        tracing::warn!("{}", warning);
    }
    Ok(config)
}

fn db_url(cli: &Cli, config: &Config) -> String {
    db::db_url(cli.db.as_deref().or(config.database.path.as_deref()))
}
