// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/stats/miner_stats.rs
// Version: 1.0.0
//
// This file implements miner-wide statistics tracking for the stratum miner,
// located in the stats subdirectory of the miner module. Workers bump the
// attempt counter; the sampler turns it into a hashrate once a second.
//
// Tree Location:
// - src/miner/stats/miner_stats.rs (miner-wide statistics logic)
// - Depends on: std, log

use crate::utils::format::FormatUtils;
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const LOG_TARGET: &str = "stratum_miner::miner::stats";

pub struct MinerStats {
    /// Hash attempts across every worker
    pub hashes_computed: AtomicU64,
    /// Shares that passed the local difficulty check
    pub shares_found: AtomicU64,
    hashrate: AtomicU64,
    job_height: AtomicU64,
    job_difficulty: AtomicU64,
    start_time: Instant,
    last_sample: Mutex<(Instant, u64)>,
}

impl Default for MinerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl MinerStats {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            hashes_computed: AtomicU64::new(0),
            shares_found: AtomicU64::new(0),
            hashrate: AtomicU64::new(0),
            job_height: AtomicU64::new(0),
            job_difficulty: AtomicU64::new(0),
            start_time: now,
            last_sample: Mutex::new((now, 0)),
        }
    }

    pub fn record_hash(&self) {
        self.hashes_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_share_found(&self) {
        self.shares_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_job(&self, height: u64, difficulty: u64) {
        self.job_height.store(height, Ordering::Relaxed);
        self.job_difficulty.store(difficulty, Ordering::Relaxed);
    }

    /// Update the hashrate from the counter delta since the previous sample
    pub fn sample_hashrate(&self) -> u64 {
        let now = Instant::now();
        let total = self.hashes_computed.load(Ordering::Relaxed);
        let mut last = self.last_sample.lock().unwrap_or_else(PoisonError::into_inner);
        let elapsed = now.duration_since(last.0).as_secs_f64();
        if elapsed <= 0.0 {
            return self.hashrate();
        }
        let rate = (total.saturating_sub(last.1) as f64 / elapsed) as u64;
        *last = (now, total);
        self.hashrate.store(rate, Ordering::Relaxed);
        rate
    }

    /// Most recent sampled hashrate in H/s
    pub fn hashrate(&self) -> u64 {
        self.hashrate.load(Ordering::Relaxed)
    }

    pub fn total_hashes(&self) -> u64 {
        self.hashes_computed.load(Ordering::Relaxed)
    }

    pub fn job_height(&self) -> u64 {
        self.job_height.load(Ordering::Relaxed)
    }

    pub fn job_difficulty(&self) -> u64 {
        self.job_difficulty.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log one summary line with share counts supplied by the pool client
    pub fn log_summary(&self, accepted: u64, rejected: u64) {
        info!(target: LOG_TARGET,
            "📊 Summary | height {} | difficulty {} | accepted {} | rejected {} | found {} | {} | uptime {}",
            self.job_height(),
            FormatUtils::format_difficulty(self.job_difficulty()),
            accepted,
            rejected,
            self.shares_found.load(Ordering::Relaxed),
            FormatUtils::format_hashrate(self.hashrate() as f64),
            FormatUtils::format_uptime(self.uptime()),
        );
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - Hashrate is sampled from counter deltas instead of the session average.
//   - Replaced the dashboard with a one-line periodic summary; share
//     acceptance counts now come from the pool client.
//   - Dropped per-thread statistics and activity history.
