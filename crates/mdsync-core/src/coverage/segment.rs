//! Next-segment query: the next uniformly cached or uncached stretch.

use crate::interval::IntervalSet;

use super::{check_bound, to_intervals, CoverageError, TimeRange};

/// Coverage state of a segment.
///
/// `Unknown` is returned when the segment starts at a single-timestamp
/// cached interval: such a point marks a known boundary with unconfirmed
/// coverage on either side, so neither `Cached` nor `Uncached` would be
/// honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Cached,
    Uncached,
    Unknown,
}

/// A sub-range of the query bound that is uniformly cached or uncached.
/// `from` always equals the query's `from`; `to` never exceeds the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: i64,
    pub to: i64,
    pub coverage: Coverage,
}

/// Computes the next segment of `[from, to]` given the raw cached ranges.
///
/// Single-point cached intervals receive skip-to-next handling so callers
/// stepping through coverage never spin on a zero-width "cached" claim.
pub fn to_next_segment(
    from: i64,
    to: i64,
    cached: &[TimeRange],
) -> Result<Segment, CoverageError> {
    check_bound(from, to)?;

    let ranges = IntervalSet::new()
        .union_all(to_intervals(cached))
        .intersection(from, to);

    let Some(head) = ranges.first() else {
        // Nothing cached inside the bound at all.
        return Ok(Segment { from, to, coverage: Coverage::Uncached });
    };

    if head.lower > from {
        // The bound starts in a hole; the segment runs up to the cached data.
        return Ok(Segment { from, to: head.lower, coverage: Coverage::Uncached });
    }

    if head.is_point() {
        let segment_to = match ranges.intervals().get(1) {
            Some(second) => second.lower,
            None => to,
        };
        return Ok(Segment { from, to: segment_to, coverage: Coverage::Unknown });
    }

    Ok(Segment { from, to: head.upper, coverage: Coverage::Cached })
}
