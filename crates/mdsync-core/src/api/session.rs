//! Push-event sessions: one awaitable call per import or job.
//!
//! The channel is opened before the work is requested so a terminal event
//! can never be missed, then drained until the event for our id arrives.
//! The stream ending first is a failure, not a normal return.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::coverage::TimeRange;

use super::error::ApiError;
use super::event::PushEvent;
use super::http::HttpWorkerClient;
use super::types::{JobConfig, WatchTarget};

type EventStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn open_channel(client: &HttpWorkerClient) -> Result<EventStream, ApiError> {
    let (stream, _) = connect_async(client.ws_url().as_str())
        .await
        .map_err(|e| ApiError::ChannelOpen {
            url: client.ws_url().to_string(),
            reason: e.to_string(),
        })?;
    Ok(stream)
}

/// Reads until a parseable push event arrives. `None` means the channel
/// ended (close frame, transport error, or EOF).
async fn next_event(events: &mut EventStream) -> Option<PushEvent> {
    while let Some(message) = events.next().await {
        match message {
            Ok(Message::Text(text)) => {
                // The channel carries other traffic too; skip what isn't ours.
                if let Ok(event) = serde_json::from_str::<PushEvent>(&text) {
                    return Some(event);
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = events.send(Message::Pong(payload)).await;
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
    None
}

/// Starts an import and resolves when the worker reports it done.
pub(super) async fn import_and_wait(
    client: &HttpWorkerClient,
    range: TimeRange,
    watch: &WatchTarget,
) -> Result<(), ApiError> {
    let mut events = open_channel(client).await?;
    let import_id = client.start_import(range, watch).await?;
    tracing::debug!(import_id = %import_id, from = range.from, to = range.to, "import started");

    loop {
        let Some(event) = next_event(&mut events).await else {
            return Err(ApiError::ChannelClosedEarly { job_id: Some(import_id) });
        };
        match event {
            PushEvent::ImportUpdate { import_id: id, updates } if id == import_id => {
                if updates.done {
                    tracing::debug!(import_id = %import_id, "import finished");
                    return Ok(());
                }
            }
            PushEvent::ImportError { import_id: id, payload } if id == import_id => {
                return Err(ApiError::Remote { payload });
            }
            _ => {}
        }
    }
}

/// Starts a session job and resolves on its terminal event.
pub(super) async fn run_job(
    client: &HttpWorkerClient,
    config: &JobConfig,
) -> Result<(), ApiError> {
    let mut events = open_channel(client).await?;
    let started = client.start_job(config).await?;
    tracing::debug!(job_id = %started.id, "job started");

    if started.errored {
        return Err(ApiError::Remote {
            payload: serde_json::json!({ "job_id": started.id, "errored": true }),
        });
    }
    if started.stopped {
        return Ok(());
    }

    loop {
        let Some(event) = next_event(&mut events).await else {
            return Err(ApiError::ChannelClosedEarly { job_id: Some(started.id) });
        };
        match event {
            PushEvent::JobStopped { job_id } if job_id == started.id => {
                tracing::debug!(job_id = %job_id, "job stopped");
                return Ok(());
            }
            PushEvent::JobError { job_id, payload } if job_id == started.id => {
                return Err(ApiError::Remote { payload });
            }
            _ => {}
        }
    }
}
