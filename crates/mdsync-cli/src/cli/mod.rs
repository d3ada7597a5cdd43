//! CLI for the mdsync sync and dispatch engine.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use mdsync_core::api::WatchTarget;
use mdsync_core::config;

use commands::{run_capacity, run_completions, run_job, run_sync};

/// Top-level CLI for the mdsync engine.
#[derive(Debug, Parser)]
#[command(name = "mdsync")]
#[command(about = "mdsync: market-data sync and job dispatch for backtest workers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Make sure every configured host has a date range cached for a market.
    Sync {
        /// Start of the range (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        from: String,
        /// End of the range (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        to: String,
        /// Exchange the data comes from.
        #[arg(long)]
        exchange: String,
        /// Quote currency.
        #[arg(long)]
        currency: String,
        /// Traded asset.
        #[arg(long)]
        asset: String,
    },

    /// Dispatch one job to whichever host has free capacity.
    Run {
        /// Start of the job's date range (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        from: String,
        /// End of the job's date range (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        to: String,
        /// Exchange the data comes from.
        #[arg(long)]
        exchange: String,
        /// Quote currency.
        #[arg(long)]
        currency: String,
        /// Traded asset.
        #[arg(long)]
        asset: String,
        /// Run a live session job instead of a backtest.
        #[arg(long)]
        live: bool,
    },

    /// Show configured hosts and total pool capacity.
    Capacity,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync { from, to, exchange, currency, asset } => {
                let watch = WatchTarget::new(exchange, currency, asset);
                run_sync(&cfg, &from, &to, watch).await?;
            }
            CliCommand::Run { from, to, exchange, currency, asset, live } => {
                let watch = WatchTarget::new(exchange, currency, asset);
                run_job(&cfg, &from, &to, watch, live).await?;
            }
            CliCommand::Capacity => run_capacity(&cfg)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
