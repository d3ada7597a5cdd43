//! HTTP + websocket implementation of the worker API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::coverage::TimeRange;
use crate::pool::HostSpec;

use super::error::ApiError;
use super::session;
use super::types::{JobConfig, JobMode, WatchTarget};
use super::{Connect, WorkerApi};

/// Client for one worker host: JSON requests against `/api/*`, push events
/// over a websocket on the same endpoint.
#[derive(Debug, Clone)]
pub struct HttpWorkerClient {
    http: reqwest::Client,
    base: Url,
    ws_url: Url,
}

impl HttpWorkerClient {
    pub fn new(host: &HostSpec) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), host)
    }

    /// Builds a client sharing an existing connection pool.
    pub fn with_client(http: reqwest::Client, host: &HostSpec) -> Result<Self, ApiError> {
        let base = parse_endpoint(&format!("http://{}:{}/", host.address, host.port))?;
        let ws_url = parse_endpoint(&format!("ws://{}:{}/", host.address, host.port))?;
        Ok(Self { http, base, ws_url })
    }

    pub(super) fn ws_url(&self) -> &Url {
        &self.ws_url
    }

    async fn post<B>(&self, path: &str, body: &B) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base.join(path).map_err(|source| ApiError::Endpoint {
            endpoint: format!("{}{}", self.base, path),
            source,
        })?;
        let response = self.http.post(url.clone()).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(response)
    }

    /// Starts an import without waiting for it; returns the import id.
    pub(super) async fn start_import(
        &self,
        range: TimeRange,
        watch: &WatchTarget,
    ) -> Result<String, ApiError> {
        let request = ImportRequest {
            watch,
            importer: ImporterSection { daterange: IsoRange::from(range) },
            candle_writer: CandleWriterSection { enabled: true },
        };
        let started: Started = self.post("api/import", &request).await?.json().await?;
        Ok(started.id)
    }

    /// Starts a session job without waiting; returns the worker's job state.
    pub(super) async fn start_job(&self, config: &JobConfig) -> Result<StartedJob, ApiError> {
        let request = JobRequest::from(config);
        let started: StartedJob = self.post("api/startJob", &request).await?.json().await?;
        Ok(started)
    }
}

#[async_trait]
impl WorkerApi for HttpWorkerClient {
    async fn scan(&self, watch: &WatchTarget) -> Result<Vec<TimeRange>, ApiError> {
        let ranges = self
            .post("api/scan", &ScanRequest { watch })
            .await?
            .json()
            .await?;
        Ok(ranges)
    }

    async fn import_and_wait(
        &self,
        range: TimeRange,
        watch: &WatchTarget,
    ) -> Result<(), ApiError> {
        session::import_and_wait(self, range, watch).await
    }

    async fn run_backtest(&self, config: &JobConfig) -> Result<serde_json::Value, ApiError> {
        let result = self
            .post("api/backtest", &JobRequest::from(config))
            .await?
            .json()
            .await?;
        Ok(result)
    }

    async fn run_job_session(&self, config: &JobConfig) -> Result<(), ApiError> {
        session::run_job(self, config).await
    }

    async fn delete_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.post("api/deleteJob", &DeleteJobRequest { id: job_id })
            .await?;
        Ok(())
    }

    async fn get_candles(
        &self,
        range: TimeRange,
        candle_size: u32,
        watch: &WatchTarget,
    ) -> Result<serde_json::Value, ApiError> {
        let request = CandleRequest {
            watch,
            daterange: IsoRange::from(range),
            candle_size,
        };
        let candles = self.post("api/getCandles", &request).await?.json().await?;
        Ok(candles)
    }
}

/// Builds [`HttpWorkerClient`]s that share one connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    http: reqwest::Client,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

impl Connect for HttpConnector {
    type Api = HttpWorkerClient;

    fn connect(&self, host: &HostSpec) -> Result<HttpWorkerClient, ApiError> {
        HttpWorkerClient::with_client(self.http.clone(), host)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ApiError> {
    Url::parse(endpoint).map_err(|source| ApiError::Endpoint {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Workers exchange dateranges as UTC ISO-8601 strings.
#[derive(Debug, Serialize)]
struct IsoRange {
    from: String,
    to: String,
}

impl From<TimeRange> for IsoRange {
    fn from(range: TimeRange) -> Self {
        Self { from: iso8601(range.from), to: iso8601(range.to) }
    }
}

fn iso8601(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    watch: &'a WatchTarget,
}

#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    watch: &'a WatchTarget,
    importer: ImporterSection,
    #[serde(rename = "candleWriter")]
    candle_writer: CandleWriterSection,
}

#[derive(Debug, Serialize)]
struct ImporterSection {
    daterange: IsoRange,
}

#[derive(Debug, Serialize)]
struct CandleWriterSection {
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct JobRequest<'a> {
    watch: &'a WatchTarget,
    daterange: IsoRange,
    mode: JobMode,
}

impl<'a> From<&'a JobConfig> for JobRequest<'a> {
    fn from(config: &'a JobConfig) -> Self {
        Self {
            watch: &config.watch,
            daterange: IsoRange::from(config.range),
            mode: config.mode,
        }
    }
}

#[derive(Debug, Serialize)]
struct DeleteJobRequest<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct CandleRequest<'a> {
    watch: &'a WatchTarget,
    daterange: IsoRange,
    #[serde(rename = "candleSize")]
    candle_size: u32,
}

#[derive(Debug, Deserialize)]
struct Started {
    id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct StartedJob {
    pub(super) id: String,
    #[serde(default)]
    pub(super) stopped: bool,
    #[serde(default)]
    pub(super) errored: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso8601_is_utc_seconds() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00Z");
        assert_eq!(iso8601(1_546_300_800), "2019-01-01T00:00:00Z");
    }

    #[test]
    fn client_rejects_malformed_address() {
        let host = HostSpec::new("bad host name", 3000, 1);
        assert!(matches!(
            HttpWorkerClient::new(&host),
            Err(ApiError::Endpoint { .. })
        ));
    }

    #[test]
    fn job_request_serializes_worker_shape() {
        let config = JobConfig {
            watch: WatchTarget::new("kraken", "USD", "BTC"),
            range: TimeRange::new(0, 60),
            mode: JobMode::Backtest,
        };
        let value = serde_json::to_value(JobRequest::from(&config)).unwrap();
        assert_eq!(value["watch"]["exchange"], "kraken");
        assert_eq!(value["daterange"]["from"], "1970-01-01T00:00:00Z");
        assert_eq!(value["mode"], "backtest");
    }
}
