//! Capacity tokens and the RAII release guard.

use std::cmp::Ordering;
use std::sync::Arc;

use super::spec::HostSpec;
use super::HostPool;

/// One unit of permitted concurrent job execution on a specific host.
///
/// Tokens are fungible within a host and deliberately not `Clone`:
/// ownership transfers to whichever caller acquires one, and each acquire
/// must be balanced by exactly one release.
#[derive(Debug)]
pub struct HostToken {
    pub(super) host: Arc<HostSpec>,
    pub(super) weight: u32,
}

impl HostToken {
    /// The host this token grants capacity on.
    pub fn host(&self) -> &HostSpec {
        &self.host
    }

    /// Priority weight, highest for the earliest-configured host.
    pub fn weight(&self) -> u32 {
        self.weight
    }
}

/// Heap entry: tokens are retrieved by descending weight, then by release
/// order (`seq`) so equal-weight tokens cycle in arrival order.
#[derive(Debug)]
pub(super) struct TokenEntry {
    pub(super) token: HostToken,
    pub(super) seq: u64,
}

impl PartialEq for TokenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.token.weight == other.token.weight && self.seq == other.seq
    }
}

impl Eq for TokenEntry {}

impl PartialOrd for TokenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum: highest weight wins, lowest seq
        // breaks ties.
        self.token
            .weight
            .cmp(&other.token.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Releases its token back to the pool when dropped, on every exit path.
/// An already-taken guard is a no-op, so release happens exactly once.
#[derive(Debug)]
pub struct TokenGuard<'a> {
    pool: &'a HostPool,
    token: Option<HostToken>,
}

impl<'a> TokenGuard<'a> {
    pub fn new(pool: &'a HostPool, token: HostToken) -> Self {
        Self { pool, token: Some(token) }
    }

    pub fn token(&self) -> Option<&HostToken> {
        self.token.as_ref()
    }
}

impl Drop for TokenGuard<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.pool.release(token);
        }
    }
}
