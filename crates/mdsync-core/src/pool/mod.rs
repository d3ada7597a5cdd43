//! Host capacity pool.
//!
//! Holds one capacity token per configured worker thread across all hosts,
//! ordered for retrieval by host priority (earlier-configured hosts first).
//! `acquire` suspends the calling task until a token is available; `release`
//! never blocks. The pool is the only shared mutable state in the scheduler
//! and serializes all take/put operations internally.

mod spec;
mod token;

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::Semaphore;

pub use spec::{HostSpec, DEFAULT_WORKER_PORT};
pub use token::{HostToken, TokenGuard};

use token::TokenEntry;

/// Invalid host configuration. These are programming errors on the caller's
/// side and fail pool construction fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("no hosts configured")]
    NoHosts,
    #[error("host list has zero total threads")]
    NoCapacity,
}

/// Priority-weighted token pool bounding concurrent jobs per host.
///
/// Waiters are served in arrival order (the semaphore is FIFO-fair), and
/// each waiter receives the highest-priority token available at wake-up.
/// Abandoning a pending `acquire` (dropping the future) never consumes a
/// future release.
#[derive(Debug)]
pub struct HostPool {
    tokens: Mutex<BinaryHeap<TokenEntry>>,
    available: Semaphore,
    seq: AtomicU64,
    total: usize,
    hosts: Vec<Arc<HostSpec>>,
}

impl HostPool {
    /// Builds the pool from hosts in priority order: one token per thread,
    /// weighted so earlier hosts are handed out first.
    pub fn new(hosts: &[HostSpec]) -> Result<Self, PoolError> {
        if hosts.is_empty() {
            return Err(PoolError::NoHosts);
        }

        let hosts: Vec<Arc<HostSpec>> = hosts.iter().cloned().map(Arc::new).collect();
        let host_count = hosts.len() as u32;
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;
        for (index, host) in hosts.iter().enumerate() {
            let weight = host_count - index as u32;
            for _ in 0..host.threads {
                heap.push(TokenEntry {
                    token: HostToken { host: Arc::clone(host), weight },
                    seq,
                });
                seq += 1;
            }
        }

        if heap.is_empty() {
            return Err(PoolError::NoCapacity);
        }

        let total = heap.len();
        Ok(Self {
            tokens: Mutex::new(heap),
            available: Semaphore::new(total),
            seq: AtomicU64::new(seq),
            total,
            hosts,
        })
    }

    /// Waits until a token is available and returns the highest-priority one.
    pub async fn acquire(&self) -> HostToken {
        let permit = self
            .available
            .acquire()
            .await
            .expect("pool semaphore never closes");
        permit.forget();
        // A forgotten permit guarantees a token is present; no await happens
        // between the forget and the pop.
        let entry = self
            .tokens
            .lock()
            .unwrap()
            .pop()
            .expect("token present for every forgotten permit");
        entry.token
    }

    /// Acquires a token wrapped in a guard that releases it on drop.
    pub async fn acquire_guard(&self) -> TokenGuard<'_> {
        let token = self.acquire().await;
        TokenGuard::new(self, token)
    }

    /// Returns a token to its host's sub-pool. Never blocks; safe to call
    /// when no acquirer is waiting.
    pub fn release(&self, token: HostToken) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.tokens.lock().unwrap().push(TokenEntry { token, seq });
        self.available.add_permits(1);
    }

    /// Sum of thread counts across all hosts; constant for the pool's lifetime.
    pub fn total_capacity(&self) -> usize {
        self.total
    }

    /// Tokens currently in the pool (not held by callers).
    pub fn available(&self) -> usize {
        self.available.available_permits()
    }

    /// Configured hosts in priority order.
    pub fn hosts(&self) -> impl Iterator<Item = &HostSpec> {
        self.hosts.iter().map(Arc::as_ref)
    }
}
