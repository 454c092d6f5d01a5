//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command
//!
//! Every command opens the handles it needs and releases them before it
//! returns. Remote-facing logic is generic over the driver so it runs the same
//! against Oracle and against the in-memory stand-in.

use clap::Subcommand;

pub mod add;
pub mod ping;
pub mod search;
pub mod seed;
pub mod upload;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Seed(args) => seed::run(ctx, args),
        Commands::Add(args) => add::run(ctx, args),
        Commands::Search(args) => search::run(ctx, args),
        Commands::Upload(args) => upload::run(ctx, args),
        Commands::Ping(args) => ping::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop the local records table and reload the bootstrap rows
    Seed(seed::SeedArgs),

    /// Add one record to the local store
    Add(add::AddArgs),

    /// Search the local or remote store
    Search(search::SearchArgs),

    /// Upload local records to the remote store (all or nothing)
    Upload(upload::UploadArgs),

    /// Check that the remote store is reachable
    Ping(ping::PingArgs),
}
