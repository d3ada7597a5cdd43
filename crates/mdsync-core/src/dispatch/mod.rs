//! Job dispatcher: run one job under a host capacity token.
//!
//! Acquiring the token selects the host; the token is held for the whole
//! execution and released on every exit path by the pool's RAII guard, so
//! per-host concurrency never exceeds the configured thread count.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiError, Connect, JobConfig, JobMode, WorkerApi};
use crate::pool::{HostPool, HostSpec, TokenGuard};

/// Outcome of a dispatched job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Host the job ran on, decided by token acquisition.
    pub host: HostSpec,
    /// Backtest result payload; live sessions produce none.
    pub payload: Option<serde_json::Value>,
}

/// Executes jobs against whichever host the pool grants a token for.
pub struct JobDispatcher<C: Connect> {
    pool: Arc<HostPool>,
    connector: C,
}

impl<C: Connect> JobDispatcher<C> {
    pub fn new(pool: Arc<HostPool>, connector: C) -> Self {
        Self { pool, connector }
    }

    pub fn pool(&self) -> &HostPool {
        &self.pool
    }

    /// Acquires a capacity token, runs `config` on the granted host, and
    /// releases the token when done. Release also happens when the execution
    /// step fails or the future is dropped mid-flight.
    pub async fn run_with_token(&self, config: JobConfig) -> Result<JobOutcome> {
        self.run_with_token_for(move |_| config).await
    }

    /// Like [`run_with_token`](Self::run_with_token), but the job config may
    /// depend on which host the token selected.
    pub async fn run_with_token_for<F>(&self, make: F) -> Result<JobOutcome>
    where
        F: FnOnce(&HostSpec) -> JobConfig + Send,
    {
        let token = self.pool.acquire().await;
        let host = token.host().clone();
        let _guard = TokenGuard::new(&self.pool, token);

        let config = make(&host);
        config
            .validate()
            .with_context(|| format!("invalid job config for {}", host))?;

        let api = self
            .connector
            .connect(&host)
            .with_context(|| format!("connect to worker {}", host))?;

        tracing::debug!(host = %host, watch = %config.watch, mode = ?config.mode, "job dispatched");
        let payload = match config.mode {
            JobMode::Backtest => {
                let result = api
                    .run_backtest(&config)
                    .await
                    .with_context(|| format!("backtest {} on {}", config.watch, host))?;
                Some(result)
            }
            JobMode::Live => {
                self.run_session(&api, &config, &host).await?;
                None
            }
        };

        Ok(JobOutcome { host, payload })
    }

    /// Runs a session job; a channel that closed after the worker assigned a
    /// job id gets a best-effort cleanup request before the error surfaces
    /// (and with it, before the token is released).
    async fn run_session(&self, api: &C::Api, config: &JobConfig, host: &HostSpec) -> Result<()> {
        match api.run_job_session(config).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let ApiError::ChannelClosedEarly { job_id: Some(id) } = &err {
                    tracing::warn!(host = %host, job_id = %id, "event channel closed early, requesting job cleanup");
                    if let Err(cleanup) = api.delete_job(id).await {
                        tracing::debug!(host = %host, job_id = %id, error = %cleanup, "job cleanup request failed");
                    }
                }
                Err(err).with_context(|| format!("job session {} on {}", config.watch, host))
            }
        }
    }
}
