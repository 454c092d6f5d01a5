//! recbridge upload - Push local records to the remote store

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{
    HumanLayout, emit_human, emit_robot, robot_ok, robot_partial,
};
use crate::error::{Error, Result};
use crate::remote::{ConnectStrategy, RemoteDriver, RemoteStore, UploadCandidate, UploadOutcome};
use crate::storage::{LocalStore, SearchFilter};

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Only upload local records with this event date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "file")]
    pub date: Option<String>,

    /// Only upload local records whose identifier contains this fragment
    #[arg(long, conflicts_with = "file")]
    pub id: Option<String>,

    /// Upload rows from a JSON file (array of [id, date, payload] arrays or
    /// {id, event_date, data} objects) instead of the local store
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub submitted: usize,
    pub strategy: Option<ConnectStrategy>,
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

pub fn run(ctx: &AppContext, args: &UploadArgs) -> Result<()> {
    let candidates = match &args.file {
        Some(path) => load_candidates(path)?,
        None => {
            let filter = SearchFilter::parse(args.date.as_deref(), args.id.as_deref())?;
            local_candidates(&ctx.local_path(), &filter)?
        }
    };

    let report = upload(&ctx.remote_store()?, &candidates)?;
    emit_report(&report, ctx.robot())?;
    into_result(&report)
}

fn emit_report(report: &UploadReport, robot: bool) -> Result<()> {
    if !robot {
        emit_human(&human_report(report));
        return Ok(());
    }

    let warnings = skipped_warning(report);
    if report.outcome.committed {
        emit_robot(&robot_ok(report).with_warnings(warnings))
    } else {
        emit_robot(
            &robot_partial(
                report.outcome.rows_uploaded,
                report.outcome.failures.len(),
                report,
            )
            .with_warnings(warnings),
        )
    }
}

/// A rolled-back batch fails the command; its outcome is already printed.
fn into_result(report: &UploadReport) -> Result<()> {
    if report.outcome.committed {
        Ok(())
    } else {
        Err(Error::RolledBack {
            rejected: report.outcome.failures.len(),
            attempted: report.submitted - report.outcome.skipped,
        })
    }
}

/// Local rows matching `filter`, as upload candidates.
pub fn local_candidates(path: &Path, filter: &SearchFilter) -> Result<Vec<UploadCandidate>> {
    let store = LocalStore::open(path)?;
    let records = store.query(filter)?;
    store.close()?;
    Ok(records.into_iter().map(UploadCandidate::from).collect())
}

pub fn load_candidates(path: &Path) -> Result<Vec<UploadCandidate>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| {
        Error::Serialization(format!("upload file {}: {err}", path.display()))
    })
}

/// Open a remote session only when there is something to send.
pub fn upload<D: RemoteDriver>(
    store: &RemoteStore<D>,
    candidates: &[UploadCandidate],
) -> Result<UploadReport> {
    if candidates.is_empty() {
        return Ok(UploadReport {
            submitted: 0,
            strategy: None,
            outcome: UploadOutcome::nothing_to_do(0),
        });
    }

    let mut conn = store.open()?;
    let strategy = conn.strategy();
    let outcome = conn.upload(candidates)?;
    conn.close()?;
    Ok(UploadReport {
        submitted: candidates.len(),
        strategy: Some(strategy),
        outcome,
    })
}

fn skipped_warning(report: &UploadReport) -> Vec<String> {
    if report.outcome.skipped == 0 {
        Vec::new()
    } else {
        vec![format!(
            "{} malformed row(s) skipped",
            report.outcome.skipped
        )]
    }
}

fn human_report(report: &UploadReport) -> HumanLayout {
    let outcome = &report.outcome;
    let mut layout = HumanLayout::new();
    if outcome.committed {
        layout.title("Upload committed");
    } else {
        layout.title("Upload rolled back");
    }
    layout
        .kv("submitted", &report.submitted.to_string())
        .kv(
            if outcome.committed { "uploaded" } else { "would upload" },
            &outcome.rows_uploaded.to_string(),
        )
        .kv("skipped", &outcome.skipped.to_string())
        .kv("rejected", &outcome.failures.len().to_string());
    if let Some(strategy) = report.strategy {
        layout.kv("connected via", &strategy.to_string());
    }
    for failure in &outcome.failures {
        layout.bullet(&format!("row {}: {}", failure.offset, failure.message));
    }
    layout
}
