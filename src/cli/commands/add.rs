//! recbridge add - Enter one record into the local store

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::storage::filter::{DATE_FORMAT, parse_date};
use crate::storage::{LocalStore, Record};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Unique record identifier
    pub identifier: String,

    /// Event date (YYYY-MM-DD)
    pub event_date: String,

    /// Free-text payload
    pub payload: String,
}

pub fn run(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let event_date = parse_date(&args.event_date)?;
    let record = Record::new(
        args.identifier.trim(),
        event_date.format(DATE_FORMAT).to_string(),
        args.payload.as_str(),
    );

    let mut store = LocalStore::open(ctx.local_path())?;
    store.insert(&record)?;
    store.close()?;

    if ctx.robot() {
        emit_robot(&robot_ok(&record))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .kv("added", &record.identifier)
            .kv("event_date", &record.event_date);
        emit_human(&layout);
        Ok(())
    }
}
