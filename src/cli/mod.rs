//! Command-line interface for music-indexer.
//!
//! Running the binary without a subcommand indexes every configured media
//! directory. `list` and `init-config` are small helpers around that.

mod commands;

pub use commands::{Cli, Commands, run_command};
