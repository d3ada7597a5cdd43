//! Remote job-execution API exposed by every worker host.
//!
//! The scheduler core (orchestrator, dispatcher) talks to workers only
//! through the [`WorkerApi`] trait and obtains clients through [`Connect`],
//! so tests substitute an in-memory worker and production wires in the
//! HTTP + websocket client.

mod error;
mod event;
mod http;
mod session;
mod types;

use async_trait::async_trait;

use crate::coverage::TimeRange;
use crate::pool::HostSpec;

pub use error::ApiError;
pub use event::{ImportUpdates, PushEvent};
pub use http::{HttpConnector, HttpWorkerClient};
pub use types::{CurrencyPair, JobConfig, JobConfigError, JobMode, WatchTarget};

/// One worker host's job-execution API.
#[async_trait]
pub trait WorkerApi: Send + Sync {
    /// Lists the candle ranges already cached for `watch`.
    async fn scan(&self, watch: &WatchTarget) -> Result<Vec<TimeRange>, ApiError>;

    /// Starts a historical import covering `range` and resolves once the
    /// worker reports it done. One awaitable call per import; the event
    /// channel is managed internally.
    async fn import_and_wait(&self, range: TimeRange, watch: &WatchTarget)
        -> Result<(), ApiError>;

    /// Runs a backtest and returns the worker's result payload.
    async fn run_backtest(&self, config: &JobConfig) -> Result<serde_json::Value, ApiError>;

    /// Starts a session job and resolves when it reaches a terminal event.
    /// A channel that closes first fails with
    /// [`ApiError::ChannelClosedEarly`] carrying the assigned job id.
    async fn run_job_session(&self, config: &JobConfig) -> Result<(), ApiError>;

    /// Requests cleanup of a remote job. Best-effort from the caller's
    /// perspective.
    async fn delete_job(&self, job_id: &str) -> Result<(), ApiError>;

    /// Fetches candle data for charting.
    async fn get_candles(
        &self,
        range: TimeRange,
        candle_size: u32,
        watch: &WatchTarget,
    ) -> Result<serde_json::Value, ApiError>;
}

/// Maps a host spec to a worker API client.
pub trait Connect: Send + Sync {
    type Api: WorkerApi;

    fn connect(&self, host: &HostSpec) -> Result<Self::Api, ApiError>;
}
