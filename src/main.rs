//! Music Indexer - builds a SQLite catalog of a local music collection.
//!
//! Walks the configured media directories, reads each audio file's tags,
//! groups tracks into artists and albums (optionally enriched from Last.fm)
//! and writes the whole run to the database in one transaction.

pub mod cli;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod library;
pub mod metadata;
pub mod model;
pub mod resolver;
pub mod scanner;
pub mod slug;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(args.log_directive().parse()?))
        .init();

    cli::run_command(&args)
}
