//! Request/response types shared across worker API implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::coverage::TimeRange;

/// Identifying key for which data coverage is tracked: a data source plus
/// an instrument pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchTarget {
    pub exchange: String,
    pub currency: String,
    pub asset: String,
}

impl WatchTarget {
    pub fn new(
        exchange: impl Into<String>,
        currency: impl Into<String>,
        asset: impl Into<String>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            currency: currency.into(),
            asset: asset.into(),
        }
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.exchange, self.asset, self.currency)
    }
}

/// An instrument pair, combined with an exchange into a [`WatchTarget`]
/// by the multi-watch sync sweep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub currency: String,
    pub asset: String,
}

impl CurrencyPair {
    pub fn new(currency: impl Into<String>, asset: impl Into<String>) -> Self {
        Self { currency: currency.into(), asset: asset.into() }
    }
}

/// How a job executes on the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    /// One request/response call; the worker replies with the result payload.
    Backtest,
    /// A session: start the job, hold the push-event channel open, and
    /// resolve on a terminal event.
    Live,
}

/// Explicit job description validated at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub watch: WatchTarget,
    pub range: TimeRange,
    pub mode: JobMode,
}

impl JobConfig {
    pub fn validate(&self) -> Result<(), JobConfigError> {
        if self.range.from > self.range.to {
            return Err(JobConfigError::InvalidRange {
                from: self.range.from,
                to: self.range.to,
            });
        }
        for (field, value) in [
            ("exchange", &self.watch.exchange),
            ("currency", &self.watch.currency),
            ("asset", &self.watch.asset),
        ] {
            if value.trim().is_empty() {
                return Err(JobConfigError::EmptyWatchField(field));
            }
        }
        Ok(())
    }
}

/// Rejected job description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JobConfigError {
    #[error("job range from {from} > to {to}")]
    InvalidRange { from: i64, to: i64 },
    #[error("watch target field `{0}` is empty")]
    EmptyWatchField(&'static str),
}
