// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/cpu/thread.rs
// Version: 1.0.0
//
// This file contains the implementation of individual mining threads for the
// stratum miner, located in the cpu subdirectory of the miner module. It
// handles nonce iteration, hash computation, and share detection for CPU
// mining.
//
// A worker only decodes a job when the slot's generation moves, and it keeps
// hashing until the generation moves again. That check is the only thing that
// preempts the search; an attempt that has started always finishes.

use crate::core::difficulty::{U512, check_pow_hash, difficulty_threshold};
use crate::core::pow::PowHasher;
use crate::core::types::{Job, Share};
use crate::core::work::{SALT_SIZE, WorkBuffer};
use crate::miner::cpu::job_slot::JobSlot;
use crate::miner::stats::MinerStats;
use crate::pool::StratumClient;
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "stratum_miner::miner::thread";

/// Sleep between checks while there is nothing to search
pub const IDLE_INTERVAL: Duration = Duration::from_millis(500);

/// Everything a worker thread shares with the rest of the miner
pub struct WorkerContext {
    pub worker_id: u8,
    pub job_slot: Arc<JobSlot>,
    pub stratum: Arc<StratumClient>,
    pub hasher: Arc<dyn PowHasher>,
    pub stats: Arc<MinerStats>,
    pub cancel: CancellationToken,
    /// Runtime used to submit shares without blocking the search
    pub runtime: Handle,
}

/// A job decoded and ready to search
struct ActiveJob {
    job: Arc<Job>,
    threshold: U512,
}

pub fn start_mining_thread(ctx: WorkerContext) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("miner-{}", ctx.worker_id))
        .spawn(move || mining_thread(ctx))
}

fn mining_thread(ctx: WorkerContext) {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill(&mut salt[..]);

    let mut nonce = 0u32;
    let mut work = WorkBuffer::default();
    let mut seen_generation = 0u64;
    let mut active: Option<ActiveJob> = None;

    debug!(target: LOG_TARGET, "Worker {} started", ctx.worker_id);

    while !ctx.cancel.is_cancelled() {
        let Some((job, generation)) = ctx.job_slot.snapshot() else {
            std::thread::sleep(IDLE_INTERVAL);
            continue;
        };
        if !ctx.stratum.is_connected() {
            std::thread::sleep(IDLE_INTERVAL);
            continue;
        }

        if generation != seen_generation {
            seen_generation = generation;
            active = prepare_job(ctx.worker_id, &mut work, job);
        }

        let Some(current) = active.as_ref() else {
            std::thread::sleep(IDLE_INTERVAL);
            continue;
        };

        while ctx.job_slot.generation() == seen_generation && !ctx.cancel.is_cancelled() {
            nonce = nonce.wrapping_add(1);
            work.stamp(ctx.worker_id, &salt);
            work.set_nonce(nonce);

            let hash = ctx.hasher.hash(work.as_bytes());
            ctx.stats.record_hash();

            if check_pow_hash(&hash, &current.threshold) {
                let share = Share::new(current.job.id.clone(), work.share_nonce(), hex::encode(hash));
                submit(&ctx, share, current.job.height);
            }
        }
    }

    debug!(target: LOG_TARGET, "Worker {} stopped", ctx.worker_id);
}

/// Decode a new job into the worker's buffer. `None` means the job is not
/// searchable and the worker idles until the next one.
fn prepare_job(worker_id: u8, work: &mut WorkBuffer, job: Arc<Job>) -> Option<ActiveJob> {
    if let Err(e) = work.load(&job.blob) {
        warn!(target: LOG_TARGET, "Worker {}: skipping job {}: {}", worker_id, job.id, e);
        return None;
    }
    if let Err(e) = work.check_version() {
        warn!(target: LOG_TARGET, "Worker {}: job {}: {}", worker_id, job.id, e);
        return None;
    }
    let Some(threshold) = difficulty_threshold(job.difficulty) else {
        warn!(target: LOG_TARGET, "Worker {}: job {} has zero difficulty", worker_id, job.id);
        return None;
    };
    Some(ActiveJob { job, threshold })
}

fn submit(ctx: &WorkerContext, share: Share, height: u64) {
    ctx.stats.record_share_found();
    info!(target: LOG_TARGET,
        "💎 Worker {} found share for job {} at height {}",
        ctx.worker_id, share.job_id, height
    );

    let stratum = Arc::clone(&ctx.stratum);
    ctx.runtime.spawn(async move {
        match stratum.submit_share(&share).await {
            Ok(Some(id)) => debug!(target: LOG_TARGET, "Share for job {} sent as request {}", share.job_id, id),
            Ok(None) => debug!(target: LOG_TARGET, "Share for job {} was a duplicate", share.job_id),
            Err(e) => warn!(target: LOG_TARGET, "Failed to submit share for job {}: {}", share.job_id, e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::work::MINIBLOCK_SIZE;

    fn job(blob: String, difficulty: u64) -> Arc<Job> {
        Arc::new(Job {
            id: "j".into(),
            blob,
            height: 1,
            extra_nonce: String::new(),
            pool_wallet: String::new(),
            target: String::new(),
            difficulty,
        })
    }

    fn blob(first: u8) -> String {
        let mut raw = [0u8; MINIBLOCK_SIZE];
        raw[0] = first;
        hex::encode(raw)
    }

    #[test]
    fn test_prepare_accepts_supported_version() {
        let mut work = WorkBuffer::default();
        let active = prepare_job(0, &mut work, job(blob(0x01), 1)).unwrap();
        assert_eq!(active.threshold, U512::one() << 256);
        assert_eq!(work.version(), 1);
    }

    #[test]
    fn test_prepare_refuses_unsearchable_jobs() {
        let mut work = WorkBuffer::default();
        assert!(prepare_job(0, &mut work, job(blob(0x02), 1)).is_none());
        assert!(prepare_job(0, &mut work, job("abcd".into(), 1)).is_none());
        assert!(prepare_job(0, &mut work, job(blob(0x01), 0)).is_none());
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - Workers read the shared job slot and are preempted by its generation
//     counter instead of polling a broadcast channel.
//   - Each worker stamps its salt, id and big-endian nonce into the work
//     buffer and checks the full 256-bit threshold.
//   - Shares go straight to the pool client on the tokio runtime.
//   - Removed the SHA-256 header path and nonce batching.
