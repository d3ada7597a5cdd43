//! Data-coverage analysis for a worker's candle cache.
//!
//! Pure functions over a query bound and the raw (unsorted, possibly
//! overlapping) cached ranges a worker reports: `find_next_gap` yields the
//! first uncovered sub-range to import, `to_next_segment` the next
//! uniformly-cached or uniformly-uncached stretch. The sync orchestrator
//! drives convergence with the former; the latter is exposed for callers
//! that walk coverage directly.

mod gap;
mod segment;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::Interval;

pub use gap::find_next_gap;
pub use segment::{to_next_segment, Coverage, Segment};

/// A `[from, to]` range of epoch seconds, `from <= to`. Doubles as the
/// coverage query bound and as the cached-range element of a scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }
}

/// Analyzer input violation. A bound with `from > to` is a programming
/// error on the caller's side and is never silently reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoverageError {
    #[error("invalid query bound: from {from} > to {to}")]
    InvalidBound { from: i64, to: i64 },
}

fn check_bound(from: i64, to: i64) -> Result<(), CoverageError> {
    if from > to {
        return Err(CoverageError::InvalidBound { from, to });
    }
    Ok(())
}

/// Raw scan results may contain inverted ranges from a misbehaving worker;
/// those carry no coverage information and are skipped.
fn to_intervals(ranges: &[TimeRange]) -> impl Iterator<Item = Interval> + '_ {
    ranges
        .iter()
        .filter(|r| r.from <= r.to)
        .map(|r| Interval::new(r.from, r.to))
}
