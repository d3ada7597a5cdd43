//! Sync orchestrator: converge worker caches toward a target range.
//!
//! Each pass scans the worker, finds the next gap and imports it (padded so
//! the provider re-fetch overlaps existing data), then re-scans: an import
//! may reveal further gaps, or the provider may return less than requested.
//! Per host/watch the loop is sequential by design: no concurrent gap
//! filling for the same dataset, so ranges are never imported twice.

use std::collections::HashSet;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::api::{Connect, CurrencyPair, WatchTarget, WorkerApi};
use crate::coverage::{self, TimeRange};
use crate::pool::HostSpec;

/// One day; the default padding applied to each side of an imported gap to
/// reduce edge thrashing against provider rate limits and boundary rounding.
pub const DEFAULT_IMPORT_PAD_SECS: i64 = 86_400;

/// Progress notification sent to an observer, one per convergence pass.
#[derive(Debug, Clone)]
pub struct SyncProgress {
    pub host: HostSpec,
    pub watch: WatchTarget,
    /// Gap being imported this pass; `None` means the target converged.
    pub importing: Option<TimeRange>,
}

/// Drives data-readiness for one or many hosts and watch targets.
pub struct SyncOrchestrator<C: Connect> {
    connector: C,
    hosts: Vec<HostSpec>,
    pad_secs: i64,
    progress: Option<mpsc::Sender<SyncProgress>>,
}

impl<C: Connect> SyncOrchestrator<C> {
    /// `hosts` in priority order; used by the all-hosts and all-watches
    /// sweeps. Single-host syncs name their host explicitly.
    pub fn new(connector: C, hosts: Vec<HostSpec>) -> Self {
        Self {
            connector,
            hosts,
            pad_secs: DEFAULT_IMPORT_PAD_SECS,
            progress: None,
        }
    }

    /// Overrides the import padding (seconds each side of a gap).
    pub fn with_import_pad(mut self, pad_secs: i64) -> Self {
        self.pad_secs = pad_secs.max(0);
        self
    }

    /// Attaches a progress observer. Sends are best-effort; a full or
    /// dropped receiver never fails the sync.
    pub fn with_progress(mut self, tx: mpsc::Sender<SyncProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Repeatedly scans `host` and imports the next gap until `range` is
    /// fully covered for `watch`. A worker-reported error terminates the
    /// loop and surfaces to the caller.
    pub async fn ensure_data_ready(
        &self,
        range: TimeRange,
        watch: &WatchTarget,
        host: &HostSpec,
    ) -> Result<()> {
        let api = self
            .connector
            .connect(host)
            .with_context(|| format!("connect to worker {}", host))?;

        loop {
            tracing::debug!(
                host = %host, watch = %watch, from = range.from, to = range.to,
                "scanning cached ranges"
            );
            let cached = api
                .scan(watch)
                .await
                .with_context(|| format!("scan {} on {}", watch, host))?;

            let Some(gap) = coverage::find_next_gap(range.from, range.to, &cached)? else {
                self.notify(host, watch, None).await;
                tracing::info!(host = %host, watch = %watch, "data ready");
                return Ok(());
            };

            self.notify(host, watch, Some(gap)).await;
            let padded = TimeRange::new(
                gap.from.saturating_sub(self.pad_secs),
                gap.to.saturating_add(self.pad_secs),
            );
            tracing::info!(
                host = %host, watch = %watch, from = padded.from, to = padded.to,
                "importing gap"
            );
            api.import_and_wait(padded, watch)
                .await
                .with_context(|| format!("import {} on {}", watch, host))?;
        }
    }

    /// Runs [`ensure_data_ready`](Self::ensure_data_ready) against every
    /// unique configured host, sequentially.
    pub async fn ensure_data_ready_all_hosts(
        &self,
        range: TimeRange,
        watch: &WatchTarget,
    ) -> Result<()> {
        let unique = self.unique_hosts();
        for (i, host) in unique.iter().enumerate() {
            tracing::info!("checking database {} of {}", i + 1, unique.len());
            self.ensure_data_ready(range, watch, host).await?;
            tracing::info!("database {} of {} is ready", i + 1, unique.len());
        }
        Ok(())
    }

    /// Syncs every (exchange, pair) dataset on every host, sequentially.
    pub async fn ensure_data_ready_all_watches(
        &self,
        range: TimeRange,
        exchanges: &[String],
        pairs: &[CurrencyPair],
    ) -> Result<()> {
        let total = self.unique_hosts().len() * exchanges.len() * pairs.len();
        tracing::info!("checking {} market data sets", total);

        let mut checked = 0;
        for exchange in exchanges {
            for pair in pairs {
                let watch = WatchTarget::new(
                    exchange.clone(),
                    pair.currency.clone(),
                    pair.asset.clone(),
                );
                self.ensure_data_ready_all_hosts(range, &watch).await?;
                checked += self.unique_hosts().len();
                tracing::debug!("checked {} of {} data sets", checked, total);
            }
        }
        tracing::info!("all databases are in sync");
        Ok(())
    }

    /// Hosts deduped by `(address, port)`, preserving priority order. Two
    /// ports on one machine are distinct workers.
    fn unique_hosts(&self) -> Vec<&HostSpec> {
        let mut seen = HashSet::new();
        self.hosts
            .iter()
            .filter(|h| seen.insert((h.address.as_str(), h.port)))
            .collect()
    }

    async fn notify(&self, host: &HostSpec, watch: &WatchTarget, importing: Option<TimeRange>) {
        if let Some(tx) = &self.progress {
            let _ = tx
                .send(SyncProgress {
                    host: host.clone(),
                    watch: watch.clone(),
                    importing,
                })
                .await;
        }
    }
}
