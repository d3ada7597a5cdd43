//! Next-gap query: the first uncovered sub-range within a bound.

use crate::interval::IntervalSet;

use super::{check_bound, to_intervals, CoverageError, TimeRange};

/// Finds the first sub-range of `[from, to]` not covered by `cached`, or
/// `None` when the bound is fully covered.
///
/// Where the gap touches an existing cached boundary it is expanded by one
/// second on that side, so a subsequent import overlaps the neighboring
/// cached data instead of leaving a one-second seam. The returned range
/// never starts before `from` and never ends after `to`.
pub fn find_next_gap(
    from: i64,
    to: i64,
    cached: &[TimeRange],
) -> Result<Option<TimeRange>, CoverageError> {
    check_bound(from, to)?;

    let gaps = IntervalSet::new()
        .union_all(to_intervals(cached))
        .complement()
        .intersection(from, to);

    let Some(gap) = gaps.first() else {
        return Ok(None);
    };

    // A gap starting after `from` abuts a cached interval on its left;
    // back up one second onto it.
    let lower = if gap.lower > from { gap.lower - 1 } else { gap.lower };
    let upper = to.min(gap.upper.saturating_add(1));

    Ok(Some(TimeRange::new(lower, upper)))
}
