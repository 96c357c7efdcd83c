// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/cpu/miner.rs
// Version: 1.0.0
//
// This file contains the CPU miner orchestrator, located in the cpu
// subdirectory of the miner module. It validates the thread count, feeds pool
// jobs into the shared job slot, runs the worker threads and the periodic
// sampling, reporting and summary tasks, and tears everything down when the
// cancellation token fires.
//
// Tree Location:
// - src/miner/cpu/miner.rs (CPU miner orchestrator)
// - Depends on: tokio, tokio-util, log

use crate::core::pow::PowHasher;
use crate::core::types::Job;
use crate::miner::cpu::job_slot::JobSlot;
use crate::miner::cpu::thread::{WorkerContext, start_mining_thread};
use crate::miner::error::{ConfigError, MinerError};
use crate::miner::stats::MinerStats;
use crate::pool::broadcast::Listener;
use crate::pool::{Response, StratumClient, StratumError};
use crate::utils::format::FormatUtils;
use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "stratum_miner::miner::cpu";

/// Thread counts above this are rejected outright
pub const MAX_THREADS: usize = 2048;

/// Thread counts above this are clamped; worker ids must fit in one byte
pub const SOFT_MAX_THREADS: usize = 255;

const JOB_BUFFER: usize = 64;
const RESPONSE_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub threads: usize,
    /// Interval between hashrate reports sent to the pool
    pub report_interval: Duration,
    pub sample_interval: Duration,
    pub summary_interval: Duration,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            report_interval: Duration::from_secs(30),
            sample_interval: Duration::from_secs(1),
            summary_interval: Duration::from_secs(30),
        }
    }
}

/// Reject counts outside `1..=MAX_THREADS`, clamp counts above `SOFT_MAX_THREADS`
pub fn validate_thread_count(count: usize) -> Result<usize, ConfigError> {
    if count < 1 || count > MAX_THREADS {
        return Err(ConfigError::InvalidThreadCount {
            count,
            max: MAX_THREADS,
        });
    }
    if count > SOFT_MAX_THREADS {
        warn!(target: LOG_TARGET,
            "Thread count {} exceeds {}, clamping to {}",
            count, SOFT_MAX_THREADS, SOFT_MAX_THREADS
        );
        return Ok(SOFT_MAX_THREADS);
    }
    Ok(count)
}

pub struct CpuMiner {
    config: MinerConfig,
    stratum: Arc<StratumClient>,
    hasher: Arc<dyn PowHasher>,
    job_slot: Arc<JobSlot>,
    stats: Arc<MinerStats>,
    cancel: CancellationToken,
}

impl CpuMiner {
    pub fn new(
        mut config: MinerConfig,
        stratum: Arc<StratumClient>,
        hasher: Arc<dyn PowHasher>,
        cancel: CancellationToken,
    ) -> Result<Self, ConfigError> {
        config.threads = validate_thread_count(config.threads)?;
        Ok(Self {
            config,
            stratum,
            hasher,
            job_slot: Arc::new(JobSlot::new()),
            stats: Arc::new(MinerStats::new()),
            cancel,
        })
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Mine until the cancellation token fires, then close the pool
    /// connection and wait for every worker to stop.
    pub async fn run(self: Arc<Self>) -> Result<(), MinerError> {
        info!(target: LOG_TARGET,
            "⛏️ Starting {} mining threads for {}",
            self.config.threads,
            self.stratum.url()
        );

        // Subscribe before dialing so the login job is not missed.
        let jobs = self.stratum.job_listener(JOB_BUFFER);
        let responses = self.stratum.response_listener(RESPONSE_BUFFER);

        let mut tasks = vec![
            tokio::spawn(Arc::clone(&self).job_intake(jobs)),
            tokio::spawn(Arc::clone(&self).share_outcomes(responses)),
        ];

        let runtime = Handle::current();
        let mut workers = Vec::with_capacity(self.config.threads);
        for worker_id in 0..self.config.threads {
            let ctx = WorkerContext {
                worker_id: u8::try_from(worker_id).unwrap_or(u8::MAX),
                job_slot: Arc::clone(&self.job_slot),
                stratum: Arc::clone(&self.stratum),
                hasher: Arc::clone(&self.hasher),
                stats: Arc::clone(&self.stats),
                cancel: self.cancel.clone(),
                runtime: runtime.clone(),
            };
            match start_mining_thread(ctx) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    error!(target: LOG_TARGET, "Failed to start worker {}: {}", worker_id, e);
                    self.cancel.cancel();
                    self.stop(tasks, workers).await;
                    return Err(MinerError::Spawn(e));
                }
            }
        }

        let stats = Arc::clone(&self.stats);
        tasks.push(self.spawn_periodic(self.config.sample_interval, move || {
            stats.sample_hashrate();
            async {}
        }));

        let (stats, stratum) = (Arc::clone(&self.stats), Arc::clone(&self.stratum));
        tasks.push(self.spawn_periodic(self.config.report_interval, move || {
            let (stats, stratum) = (Arc::clone(&stats), Arc::clone(&stratum));
            async move {
                if !stratum.is_connected() {
                    return;
                }
                let hashrate = stats.hashrate();
                match stratum.report_hashrate(hashrate).await {
                    Ok(id) => debug!(target: LOG_TARGET, "Reported hashrate {} H/s (request {})", hashrate, id),
                    Err(e) => debug!(target: LOG_TARGET, "Hashrate report failed: {}", e),
                }
            }
        }));

        let (stats, stratum) = (Arc::clone(&self.stats), Arc::clone(&self.stratum));
        tasks.push(self.spawn_periodic(self.config.summary_interval, move || {
            stats.log_summary(stratum.accepted_shares(), stratum.rejected_shares());
            async {}
        }));

        self.cancel.cancelled().await;
        info!(target: LOG_TARGET, "🛑 Stopping miner");
        self.stop(tasks, workers).await;
        info!(target: LOG_TARGET,
            "Miner stopped: accepted {}, rejected {}",
            self.accepted_shares(),
            self.rejected_shares()
        );
        Ok(())
    }

    async fn stop(&self, tasks: Vec<JoinHandle<()>>, workers: Vec<std::thread::JoinHandle<()>>) {
        self.stratum.shutdown().await;
        for task in tasks {
            let _ = task.await;
        }
        let joined = tokio::task::spawn_blocking(move || {
            for worker in workers {
                if worker.join().is_err() {
                    error!(target: LOG_TARGET, "A mining thread panicked");
                }
            }
        })
        .await;
        if let Err(e) = joined {
            error!(target: LOG_TARGET, "Failed to join mining threads: {}", e);
        }
    }

    /// Dial the pool, then install every job it sends into the slot
    async fn job_intake(self: Arc<Self>, mut jobs: Listener<Arc<Job>>) {
        let dialed = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            dialed = self.stratum.dial_with_backoff() => dialed,
        };
        match dialed {
            Ok(()) => {}
            Err(StratumError::Shutdown) => return,
            Err(e) => error!(target: LOG_TARGET, "Initial dial failed: {}", e),
        }

        loop {
            let job = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                job = jobs.recv() => job,
            };
            let Some(job) = job else {
                return;
            };

            self.stats.set_job(job.height, job.difficulty);
            let generation = self.job_slot.install(Arc::clone(&job));
            info!(target: LOG_TARGET,
                "📋 Mining job {} | height {} | difficulty {} | generation {}",
                job.id,
                job.height,
                FormatUtils::format_difficulty(job.difficulty),
                generation
            );
        }
    }

    /// Log share outcomes as the pool client counts them
    async fn share_outcomes(self: Arc<Self>, mut responses: Listener<Arc<Response>>) {
        let mut accepted = self.stratum.accepted_shares();
        let mut rejected = self.stratum.rejected_shares();
        loop {
            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                response = responses.recv() => response,
            };
            let Some(response) = response else {
                return;
            };

            let (now_accepted, now_rejected) = (self.stratum.accepted_shares(), self.stratum.rejected_shares());
            if now_accepted > accepted {
                info!(target: LOG_TARGET, "✅ Share accepted ({}/{})", now_accepted, now_accepted + now_rejected);
            } else if now_rejected > rejected {
                let reason = response.error.as_ref().map_or("no result", |e| e.message.as_str());
                warn!(target: LOG_TARGET, "❌ Share rejected: {} ({} rejected)", reason, now_rejected);
            }
            accepted = now_accepted;
            rejected = now_rejected;
        }
    }

    /// Run `tick` every `period` (first run after one period) until cancelled
    fn spawn_periodic<F, Fut>(&self, period: Duration, mut tick: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => tick().await,
                }
            }
        })
    }

    /// Most recent sampled hashrate in H/s
    pub fn hashrate(&self) -> u64 {
        self.stats.hashrate()
    }

    pub fn total_shares(&self) -> u64 {
        self.stratum.total_shares()
    }

    pub fn accepted_shares(&self) -> u64 {
        self.stratum.accepted_shares()
    }

    pub fn rejected_shares(&self) -> u64 {
        self.stratum.rejected_shares()
    }

    pub fn pool_url(&self) -> &str {
        self.stratum.url()
    }

    pub fn thread_count(&self) -> usize {
        self.config.threads
    }

    pub fn stats(&self) -> Arc<MinerStats> {
        Arc::clone(&self.stats)
    }

    pub fn job_slot(&self) -> Arc<JobSlot> {
        Arc::clone(&self.job_slot)
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - Connection handling moved into the stratum client; the miner now only
//     consumes its job and response relays.
//   - Added thread count validation, hashrate sampling and reporting, and a
//     periodic summary, all stopped by one cancellation token.
//   - Removed the SV2 connection test and the share submitter channel.
