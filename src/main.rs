//! recbridge - local/remote record search and upload
//!
//! Searches a local SQLite record store or a remote Oracle table and pushes
//! local rows to the remote table in all-or-nothing batches.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use recbridge::Error;
use recbridge::app::AppContext;
use recbridge::cli::Cli;
use recbridge::cli::output::robot_error_document;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let ctx = match AppContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => return report(&e, cli.robot),
    };

    match recbridge::cli::commands::run(&ctx, &cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e, ctx.robot()),
    }
}

fn report(e: &Error, robot: bool) -> ExitCode {
    if robot {
        if let Some(doc) = robot_error_document(e) {
            println!("{}", serde_json::to_string(&doc).unwrap_or_default());
        }
    } else {
        eprintln!("Error: {e}");
    }
    ExitCode::FAILURE
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,recbridge=info",
        1 => "info,recbridge=debug",
        2 => "debug,recbridge=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
