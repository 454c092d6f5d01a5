//! recbridge search - Search the local or remote store

use std::path::Path;

use clap::{Args, ValueEnum};

use crate::app::AppContext;
use crate::cli::formatters::SearchResults;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::Result;
use crate::remote::{RemoteDriver, RemoteStore};
use crate::storage::{LocalStore, SearchFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    Local,
    Remote,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Which store to search
    #[arg(long, value_enum, default_value_t = Source::Local)]
    pub source: Source,

    /// Exact event date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Identifier fragment (substring match)
    #[arg(long)]
    pub id: Option<String>,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let filter = SearchFilter::parse(args.date.as_deref(), args.id.as_deref())?;
    let results = match args.source {
        Source::Local => search_local(&ctx.local_path(), &filter)?,
        Source::Remote => search_remote(&ctx.remote_store()?, &filter)?,
    };

    if ctx.robot() {
        emit_robot(&robot_ok(&results))
    } else {
        println!("{}", results.to_grid());
        Ok(())
    }
}

pub fn search_local(path: &Path, filter: &SearchFilter) -> Result<SearchResults> {
    let store = LocalStore::open(path)?;
    let records = store.query(filter)?;
    store.close()?;
    Ok(SearchResults::from_local(records))
}

pub fn search_remote<D: RemoteDriver>(
    store: &RemoteStore<D>,
    filter: &SearchFilter,
) -> Result<SearchResults> {
    let mut conn = store.open()?;
    let result = conn.query(filter)?;
    conn.close()?;
    Ok(SearchResults::from_remote(&result))
}
