//! Command-line front end

use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod formatters;
pub mod output;

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "recbridge",
    version,
    about = "Search local or remote record stores and upload local rows"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the global then project config)
    #[arg(long, global = true, env = "RECBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Machine-readable JSON output and JSON log lines
    #[arg(long, global = true)]
    pub robot: bool,
}
