//! Closed-interval set math over epoch seconds.
//!
//! Cached candle ranges reported by a worker are unioned into a coalesced
//! set, complemented to expose the holes, and clipped to a query bound.
//! The coverage analyzer combines these operations; nothing here does I/O.

mod set;

pub use set::{Interval, IntervalSet, DOMAIN_MAX, DOMAIN_MIN};
