//! `mdsync capacity` – show configured hosts and pool capacity.

use anyhow::Result;
use mdsync_core::config::MdsyncConfig;
use mdsync_core::pool::HostPool;

pub fn run_capacity(cfg: &MdsyncConfig) -> Result<()> {
    let pool = HostPool::new(&cfg.hosts)?;
    println!("{:<4} {:<24} {:>8}", "PRI", "HOST", "THREADS");
    for (i, host) in pool.hosts().enumerate() {
        println!("{:<4} {:<24} {:>8}", i + 1, host.endpoint(), host.threads);
    }
    println!("Total capacity: {} concurrent job(s).", pool.total_capacity());
    Ok(())
}
