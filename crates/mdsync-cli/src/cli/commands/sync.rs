//! `mdsync sync` – converge every host's cache toward a target range.

use anyhow::{ensure, Result};
use mdsync_core::api::{HttpConnector, WatchTarget};
use mdsync_core::config::MdsyncConfig;
use mdsync_core::coverage::TimeRange;
use mdsync_core::sync::{SyncOrchestrator, SyncProgress};
use std::time::Duration;

use super::{fmt_ts, parse_date};

pub async fn run_sync(
    cfg: &MdsyncConfig,
    from: &str,
    to: &str,
    watch: WatchTarget,
) -> Result<()> {
    let range = TimeRange::new(parse_date(from)?, parse_date(to)?);
    ensure!(range.from <= range.to, "--from must not be after --to");

    let connector = HttpConnector::with_timeout(Duration::from_secs(cfg.http_timeout_secs))?;

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<SyncProgress>(16);
    let printer = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            match progress.importing {
                Some(gap) => println!(
                    "  {}: importing {} .. {}",
                    progress.host,
                    fmt_ts(gap.from),
                    fmt_ts(gap.to)
                ),
                None => println!("  {}: up to date", progress.host),
            }
        }
    });

    println!(
        "Syncing {} from {} to {} on {} host(s)...",
        watch,
        fmt_ts(range.from),
        fmt_ts(range.to),
        cfg.hosts.len()
    );
    let orchestrator = SyncOrchestrator::new(connector, cfg.hosts.clone())
        .with_import_pad(cfg.import_pad_secs)
        .with_progress(progress_tx);
    let result = orchestrator.ensure_data_ready_all_hosts(range, &watch).await;

    // Drop the orchestrator (and its sender) so the printer drains and exits.
    drop(orchestrator);
    let _ = printer.await;
    result?;

    println!("All hosts ready.");
    Ok(())
}
