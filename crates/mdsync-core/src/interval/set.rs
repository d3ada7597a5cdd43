//! Interval type and the coalesced ordered set.

/// Lower bound of the epoch-second domain, used as the open end before the
/// first interval when complementing.
pub const DOMAIN_MIN: i64 = i64::MIN;

/// Upper bound of the epoch-second domain, used as the open end after the
/// last interval when complementing.
pub const DOMAIN_MAX: i64 = i64::MAX;

/// A closed range `[lower, upper]` of epoch seconds. Invariant: `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Start second (inclusive).
    pub lower: i64,
    /// End second (inclusive).
    pub upper: i64,
}

impl Interval {
    pub fn new(lower: i64, upper: i64) -> Self {
        debug_assert!(lower <= upper, "interval lower {} > upper {}", lower, upper);
        Self { lower, upper }
    }

    /// True for a single-timestamp interval (`lower == upper`).
    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }
}

/// Ordered sequence of intervals, sorted ascending by lower bound and
/// pairwise non-mergeable: for all i, `set[i].upper < set[i+1].lower - 1`.
/// Every operation returns a new set upholding that invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts each range, coalescing overlapping and adjacent intervals into
    /// the minimal sorted representation. Insertion order does not affect the
    /// result. O(n log n): one sort, one sweep.
    pub fn union_all<I>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = Interval>,
    {
        self.intervals.extend(ranges);
        self.intervals.sort_by_key(|iv| (iv.lower, iv.upper));

        let mut merged: Vec<Interval> = Vec::with_capacity(self.intervals.len());
        for iv in self.intervals.drain(..) {
            match merged.last_mut() {
                // Overlapping or adjacent: [0,10] absorbs [11,20].
                Some(last) if iv.lower <= last.upper.saturating_add(1) => {
                    last.upper = last.upper.max(iv.upper);
                }
                _ => merged.push(iv),
            }
        }
        Self { intervals: merged }
    }

    /// Returns only the portions of each interval that fall within
    /// `[from, to]`; intervals fully outside are dropped, partially
    /// overlapping ones are clipped.
    pub fn intersection(&self, from: i64, to: i64) -> Self {
        let intervals = self
            .intervals
            .iter()
            .filter(|iv| iv.upper >= from && iv.lower <= to)
            .map(|iv| Interval::new(iv.lower.max(from), iv.upper.min(to)))
            .collect();
        Self { intervals }
    }

    /// Returns the set of gaps over the full domain. The complement of an
    /// empty set is the single interval `[DOMAIN_MIN, DOMAIN_MAX]`.
    pub fn complement(&self) -> Self {
        let mut gaps = Vec::with_capacity(self.intervals.len() + 1);
        let mut cursor = DOMAIN_MIN;
        for iv in &self.intervals {
            if iv.lower > cursor {
                gaps.push(Interval::new(cursor, iv.lower - 1));
            }
            if iv.upper == DOMAIN_MAX {
                return Self { intervals: gaps };
            }
            cursor = iv.upper + 1;
        }
        gaps.push(Interval::new(cursor, DOMAIN_MAX));
        Self { intervals: gaps }
    }

    /// True iff the set contains zero intervals.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn first(&self) -> Option<&Interval> {
        self.intervals.first()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ranges: &[(i64, i64)]) -> IntervalSet {
        IntervalSet::new().union_all(ranges.iter().map(|&(lo, up)| Interval::new(lo, up)))
    }

    #[test]
    fn union_coalesces_overlapping() {
        let s = set(&[(0, 10), (5, 20), (30, 40)]);
        assert_eq!(s.intervals(), &[Interval::new(0, 20), Interval::new(30, 40)]);
    }

    #[test]
    fn union_coalesces_adjacent() {
        let s = set(&[(0, 10), (11, 20), (21, 30), (31, 90)]);
        assert_eq!(s.intervals(), &[Interval::new(0, 90)]);
    }

    #[test]
    fn union_order_independent() {
        let forward = set(&[(0, 10), (11, 20), (50, 90)]);
        let backward = set(&[(50, 90), (11, 20), (0, 10)]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn union_keeps_separated_intervals() {
        let s = set(&[(0, 10), (12, 20)]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.first(), Some(&Interval::new(0, 10)));
    }

    #[test]
    fn intersection_clips_and_drops() {
        let s = set(&[(0, 10), (20, 30), (50, 90)]);
        let clipped = s.intersection(5, 55);
        assert_eq!(
            clipped.intervals(),
            &[
                Interval::new(5, 10),
                Interval::new(20, 30),
                Interval::new(50, 55)
            ]
        );
    }

    #[test]
    fn intersection_can_be_empty() {
        let s = set(&[(0, 10)]);
        assert!(s.intersection(20, 30).is_empty());
        assert!(!s.is_empty());
    }

    #[test]
    fn complement_of_empty_spans_domain() {
        let gaps = IntervalSet::new().complement();
        assert_eq!(gaps.intervals(), &[Interval::new(DOMAIN_MIN, DOMAIN_MAX)]);
    }

    #[test]
    fn complement_has_open_ends() {
        let gaps = set(&[(10, 20), (30, 40)]).complement();
        assert_eq!(
            gaps.intervals(),
            &[
                Interval::new(DOMAIN_MIN, 9),
                Interval::new(21, 29),
                Interval::new(41, DOMAIN_MAX)
            ]
        );
    }

    #[test]
    fn complement_at_domain_edges() {
        let gaps = set(&[(DOMAIN_MIN, 0)]).complement();
        assert_eq!(gaps.intervals(), &[Interval::new(1, DOMAIN_MAX)]);

        let gaps = set(&[(0, DOMAIN_MAX)]).complement();
        assert_eq!(gaps.intervals(), &[Interval::new(DOMAIN_MIN, -1)]);

        let gaps = set(&[(DOMAIN_MIN, DOMAIN_MAX)]).complement();
        assert!(gaps.is_empty());
    }

    #[test]
    fn complement_round_trips() {
        // Union of a set's gaps with the set itself reconstructs the domain.
        let original = set(&[(0, 10), (50, 90)]);
        let rebuilt = original
            .complement()
            .union_all(original.intervals().iter().copied());
        assert_eq!(rebuilt.intervals(), &[Interval::new(DOMAIN_MIN, DOMAIN_MAX)]);

        // And complementing twice returns the original coalesced set.
        let twice = original.complement().complement();
        assert_eq!(twice, original);
    }
}
