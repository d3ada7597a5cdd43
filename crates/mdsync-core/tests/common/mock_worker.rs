//! In-memory worker for integration tests.
//!
//! Implements the `WorkerApi` seam directly: a shared cache of candle
//! ranges, scripted import/session behavior, and counters for asserting
//! concurrency and cleanup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use mdsync_core::api::{ApiError, Connect, JobConfig, WatchTarget, WorkerApi};
use mdsync_core::coverage::TimeRange;
use mdsync_core::pool::HostSpec;

/// How a mock import behaves.
#[derive(Debug, Clone, Copy)]
pub enum ImportMode {
    /// Caches exactly the requested range.
    Full,
    /// Caches at most this many seconds from the start of the request,
    /// like a provider returning less than asked for.
    Truncate(i64),
    /// Reports a worker-side import error.
    Fail,
}

/// How a mock session job ends.
#[derive(Debug, Clone)]
pub enum SessionMode {
    Stop,
    Error,
    CloseEarly { job_id: String },
}

#[derive(Debug)]
pub struct MockState {
    pub cached: Mutex<Vec<TimeRange>>,
    pub imports: Mutex<Vec<TimeRange>>,
    pub scanned_watches: Mutex<Vec<String>>,
    pub deleted_jobs: Mutex<Vec<String>>,
    pub import_mode: Mutex<ImportMode>,
    pub session_mode: Mutex<SessionMode>,
    pub fail_backtests: Mutex<bool>,
    running: Mutex<usize>,
    pub max_running: Mutex<usize>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            cached: Mutex::new(Vec::new()),
            imports: Mutex::new(Vec::new()),
            scanned_watches: Mutex::new(Vec::new()),
            deleted_jobs: Mutex::new(Vec::new()),
            import_mode: Mutex::new(ImportMode::Full),
            session_mode: Mutex::new(SessionMode::Stop),
            fail_backtests: Mutex::new(false),
            running: Mutex::new(0),
            max_running: Mutex::new(0),
        }
    }
}

impl MockState {
    pub fn with_cached(ranges: &[(i64, i64)]) -> Arc<Self> {
        let state = Self::default();
        *state.cached.lock().unwrap() = ranges
            .iter()
            .map(|&(from, to)| TimeRange::new(from, to))
            .collect();
        Arc::new(state)
    }

    pub fn set_import_mode(&self, mode: ImportMode) {
        *self.import_mode.lock().unwrap() = mode;
    }

    pub fn set_session_mode(&self, mode: SessionMode) {
        *self.session_mode.lock().unwrap() = mode;
    }

    pub fn import_count(&self) -> usize {
        self.imports.lock().unwrap().len()
    }
}

/// Client handle for one host, sharing the worker state behind it.
pub struct MockApi {
    state: Arc<MockState>,
    host: HostSpec,
}

#[async_trait]
impl WorkerApi for MockApi {
    async fn scan(&self, watch: &WatchTarget) -> Result<Vec<TimeRange>, ApiError> {
        self.state
            .scanned_watches
            .lock()
            .unwrap()
            .push(watch.to_string());
        Ok(self.state.cached.lock().unwrap().clone())
    }

    async fn import_and_wait(
        &self,
        range: TimeRange,
        _watch: &WatchTarget,
    ) -> Result<(), ApiError> {
        self.state.imports.lock().unwrap().push(range);
        let mode = *self.state.import_mode.lock().unwrap();
        match mode {
            ImportMode::Full => {
                self.state.cached.lock().unwrap().push(range);
                Ok(())
            }
            ImportMode::Truncate(cap) => {
                let to = range.to.min(range.from.saturating_add(cap));
                self.state
                    .cached
                    .lock()
                    .unwrap()
                    .push(TimeRange::new(range.from, to));
                Ok(())
            }
            ImportMode::Fail => Err(ApiError::Remote {
                payload: json!({ "error": "import failed" }),
            }),
        }
    }

    async fn run_backtest(&self, config: &JobConfig) -> Result<serde_json::Value, ApiError> {
        {
            let mut running = self.state.running.lock().unwrap();
            *running += 1;
            let mut max = self.state.max_running.lock().unwrap();
            *max = (*max).max(*running);
        }
        // Long enough for an overlapping dispatch to be observable.
        tokio::time::sleep(Duration::from_millis(30)).await;
        *self.state.running.lock().unwrap() -= 1;

        if *self.state.fail_backtests.lock().unwrap() {
            return Err(ApiError::Status {
                status: 500,
                url: format!("http://{}/api/backtest", self.host.endpoint()),
                body: "worker exploded".into(),
            });
        }
        Ok(json!({ "host": self.host.endpoint(), "watch": config.watch.to_string() }))
    }

    async fn run_job_session(&self, _config: &JobConfig) -> Result<(), ApiError> {
        let mode = self.state.session_mode.lock().unwrap().clone();
        match mode {
            SessionMode::Stop => Ok(()),
            SessionMode::Error => Err(ApiError::Remote {
                payload: json!({ "error": "strategy crashed" }),
            }),
            SessionMode::CloseEarly { job_id } => {
                Err(ApiError::ChannelClosedEarly { job_id: Some(job_id) })
            }
        }
    }

    async fn delete_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.state.deleted_jobs.lock().unwrap().push(job_id.to_string());
        Ok(())
    }

    async fn get_candles(
        &self,
        _range: TimeRange,
        _candle_size: u32,
        _watch: &WatchTarget,
    ) -> Result<serde_json::Value, ApiError> {
        Ok(json!([]))
    }
}

/// Connector mapping hosts to mock workers: per-endpoint states first,
/// shared default otherwise.
pub struct MockConnect {
    default_state: Arc<MockState>,
    per_host: HashMap<String, Arc<MockState>>,
}

impl MockConnect {
    pub fn new(default_state: Arc<MockState>) -> Self {
        Self { default_state, per_host: HashMap::new() }
    }

    pub fn with_host_state(mut self, host: &HostSpec, state: Arc<MockState>) -> Self {
        self.per_host.insert(host.endpoint(), state);
        self
    }
}

impl Connect for MockConnect {
    type Api = MockApi;

    fn connect(&self, host: &HostSpec) -> Result<MockApi, ApiError> {
        let state = self
            .per_host
            .get(&host.endpoint())
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_state));
        Ok(MockApi { state, host: host.clone() })
    }
}
