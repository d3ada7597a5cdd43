//! `mdsync run` – dispatch one job through the capacity pool.

use anyhow::{ensure, Result};
use mdsync_core::api::{HttpConnector, JobConfig, JobMode, WatchTarget};
use mdsync_core::config::MdsyncConfig;
use mdsync_core::coverage::TimeRange;
use mdsync_core::dispatch::JobDispatcher;
use mdsync_core::pool::HostPool;
use std::sync::Arc;
use std::time::Duration;

use super::parse_date;

pub async fn run_job(
    cfg: &MdsyncConfig,
    from: &str,
    to: &str,
    watch: WatchTarget,
    live: bool,
) -> Result<()> {
    let range = TimeRange::new(parse_date(from)?, parse_date(to)?);
    ensure!(range.from <= range.to, "--from must not be after --to");

    let pool = Arc::new(HostPool::new(&cfg.hosts)?);
    tracing::debug!(capacity = pool.total_capacity(), "capacity pool ready");
    let connector = HttpConnector::with_timeout(Duration::from_secs(cfg.http_timeout_secs))?;
    let dispatcher = JobDispatcher::new(pool, connector);

    let mode = if live { JobMode::Live } else { JobMode::Backtest };
    let outcome = dispatcher
        .run_with_token(JobConfig { watch, range, mode })
        .await?;

    println!("Job finished on {}.", outcome.host);
    if let Some(payload) = outcome.payload {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    Ok(())
}
