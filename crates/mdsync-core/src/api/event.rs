//! Push events received over a worker's event channel.

use serde::Deserialize;

/// A message on the worker's push-event channel, tagged by `type`.
///
/// Workers multiplex events for all running imports and jobs over one
/// channel; listeners filter by id. Messages of unrelated types fail to
/// parse and are skipped by the session loops.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    ImportUpdate {
        import_id: String,
        #[serde(default)]
        updates: ImportUpdates,
    },
    ImportError {
        import_id: String,
        #[serde(flatten)]
        payload: serde_json::Value,
    },
    JobStopped {
        job_id: String,
    },
    JobError {
        job_id: String,
        #[serde(flatten)]
        payload: serde_json::Value,
    },
}

/// Progress fields of an `import_update` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportUpdates {
    /// True on the terminal update of an import.
    #[serde(default)]
    pub done: bool,
}
