// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/main.rs
// Version: 1.0.0
//
// Command-line entry point: parse and validate arguments, start logging, then
// run the CPU miner against the pool until Ctrl+C or SIGTERM.

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use stratum_miner::core::{Args, TripleSha3};
use stratum_miner::logging;
use stratum_miner::miner::CpuMiner;
use stratum_miner::pool::StratumClient;
use stratum_miner::utils::FormatUtils;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "stratum_miner::main";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _log_handle = logging::init(&args.log_settings()).context("failed to initialise logging")?;

    if let Err(err) = args.validate() {
        error!(target: LOG_TARGET, "❌ Error: {}", err);
        std::process::exit(1);
    }

    info!(target: LOG_TARGET, "🚀 {} starting", args.agent);
    info!(target: LOG_TARGET,
        "Pool: {} | Wallet: {} | Threads: {} | Network: {}",
        args.pool,
        args.wallet,
        args.thread_count(),
        if args.testnet { "testnet" } else { "mainnet" }
    );

    let cancel = CancellationToken::new();
    let stratum = StratumClient::from_config(args.stratum_config(), &cancel).context("invalid pool endpoint")?;
    let miner = CpuMiner::new(args.miner_config(), stratum, Arc::new(TripleSha3), cancel.clone())?.into_arc();

    tokio::spawn(wait_for_signal(cancel));

    let started = std::time::Instant::now();
    Arc::clone(&miner).run().await?;

    info!(target: LOG_TARGET,
        "👋 Shutdown complete after {} | accepted {} | rejected {}",
        FormatUtils::format_uptime(started.elapsed()),
        miner.accepted_shares(),
        miner.rejected_shares()
    );
    Ok(())
}

/// Cancel `cancel` on Ctrl+C, or SIGTERM on unix
async fn wait_for_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                error!(target: LOG_TARGET, "Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!(target: LOG_TARGET, "Received shutdown signal");
    cancel.cancel();
}

// Changelog:
// - v1.0.0 (2026-10-16): Single CPU entry point.
//   - Replaced the feature-gated CPU/GPU/hybrid mains, benchmark mode and web
//     dashboard with one stratum mining loop.
//   - log4rs logging and signal-driven cancellation.
