// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/cpu/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for the CPU mining functionality of the
// stratum miner, located in the cpu subdirectory of the miner module. It
// declares submodules and re-exports key types for use throughout the project.
//
// Tree Location:
// - src/miner/cpu/mod.rs (CPU miner module entry point)
// - Submodules: job_slot, miner, thread

pub mod job_slot;
pub mod miner;
pub mod thread;

// Re-export key types for convenience
pub use job_slot::JobSlot;
pub use miner::{CpuMiner, MAX_THREADS, MinerConfig, SOFT_MAX_THREADS, validate_thread_count};

// Changelog:
// - v1.0.0 (2026-10-16): CPU module for the stratum miner.
//   - Added the job_slot submodule shared by the orchestrator and workers.
