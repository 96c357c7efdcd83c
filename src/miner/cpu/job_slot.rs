// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/cpu/job_slot.rs
// Version: 1.0.0
//
// The current job shared by every worker, paired with a generation counter that
// is bumped exactly once per replacement. The atomic mirror lets the hot loop
// check for a newer job without taking the lock.

use crate::core::types::Job;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
pub struct JobSlot {
    current: RwLock<Option<(Arc<Job>, u64)>>,
    generation: AtomicU64,
}

impl JobSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current job, returning its generation
    pub fn install(&self, job: Arc<Job>) -> u64 {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = current.as_ref().map_or(0, |(_, g)| *g) + 1;
        *current = Some((job, generation));
        self.generation.store(generation, Ordering::Release);
        generation
    }

    /// Consistent view of the job and the generation it was installed with
    pub fn snapshot(&self) -> Option<(Arc<Job>, u64)> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Latest generation; 0 before the first job
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
