//! Subcommand implementations.

mod capacity;
mod completions;
mod run;
mod sync;

use anyhow::{Context, Result};

pub use capacity::run_capacity;
pub use completions::run_completions;
pub use run::run_job;
pub use sync::run_sync;

/// Parses `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp into
/// epoch seconds.
pub(crate) fn parse_date(s: &str) -> Result<i64> {
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp());
    }
    let dt = chrono::DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("unrecognized date `{s}` (expected YYYY-MM-DD or RFC 3339)"))?;
    Ok(dt.timestamp())
}

/// Human-readable UTC rendering of an epoch second for console output.
pub(crate) fn fmt_ts(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}
