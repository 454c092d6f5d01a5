//! recbridge seed - Reset the local store to its bootstrap rows

use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{Error, Result};
use crate::storage::{LocalStore, SearchFilter};

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Confirm that existing local rows will be deleted
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
pub struct SeedReport {
    pub path: String,
    pub rows: usize,
}

pub fn run(ctx: &AppContext, args: &SeedArgs) -> Result<()> {
    if !args.yes {
        return Err(Error::Config(
            "seed deletes every local record; pass --yes to confirm".to_string(),
        ));
    }

    let report = seed(&ctx.local_path())?;
    if ctx.robot() {
        emit_robot(&robot_ok(&report))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Local store reset")
            .kv("path", &report.path)
            .kv("rows", &report.rows.to_string());
        emit_human(&layout);
        Ok(())
    }
}

pub fn seed(path: &Path) -> Result<SeedReport> {
    let mut store = LocalStore::open(path)?;
    store.reset_and_seed()?;
    let rows = store.query(&SearchFilter::all())?.len();
    let report = SeedReport {
        path: store.path().display().to_string(),
        rows,
    };
    store.close()?;
    Ok(report)
}
