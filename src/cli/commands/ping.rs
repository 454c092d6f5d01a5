//! recbridge ping - Check that the remote store answers

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::remote::{ConnectStrategy, RemoteDriver, RemoteStore};

#[derive(Args, Debug)]
pub struct PingArgs {}

#[derive(Debug, Serialize)]
pub struct PingReport {
    pub host: String,
    pub service: String,
    pub strategy: ConnectStrategy,
    pub server_time: String,
}

pub fn run(ctx: &AppContext, _args: &PingArgs) -> Result<()> {
    let report = ping(&ctx.remote_store()?)?;
    if ctx.robot() {
        emit_robot(&robot_ok(&report))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Remote store reachable")
            .kv("host", &report.host)
            .kv("service", &report.service)
            .kv("connected via", &report.strategy.to_string())
            .kv("server time", &report.server_time);
        emit_human(&layout);
        Ok(())
    }
}

pub fn ping<D: RemoteDriver>(store: &RemoteStore<D>) -> Result<PingReport> {
    let mut conn = store.open()?;
    let server_time = conn.ping()?;
    let strategy = conn.strategy();
    conn.close()?;

    let config = store.config();
    Ok(PingReport {
        host: config.host.clone().unwrap_or_default(),
        service: config.service.clone(),
        strategy,
        server_time,
    })
}
