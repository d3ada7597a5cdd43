//! Worker API failure taxonomy.

use thiserror::Error;

/// Failure talking to a worker.
///
/// Transport/session failures keep "failed to open" distinct from "closed
/// early" so callers can pick different retry strategies; remote errors
/// carry the worker's payload verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed below the API layer (connect, timeout, body).
    #[error("worker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The worker answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String, body: String },

    /// Malformed worker endpoint (bad address in the host spec).
    #[error("invalid worker endpoint {endpoint}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The push-event channel could not be opened.
    #[error("failed to open event channel to {url}: {reason}")]
    ChannelOpen { url: String, reason: String },

    /// The push-event channel closed before a terminal event arrived. When
    /// the remote had already assigned a job id it is carried here so the
    /// caller can request cleanup.
    #[error("event channel closed before a terminal event")]
    ChannelClosedEarly { job_id: Option<String> },

    /// The worker reported an explicit error event; payload attached verbatim.
    #[error("worker reported error: {payload}")]
    Remote { payload: serde_json::Value },
}
