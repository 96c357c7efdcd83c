// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for the miner functionality of the
// stratum miner, located in the miner subdirectory. It declares submodules and
// re-exports key types for use throughout the project.
//
// Tree Location:
// - src/miner/mod.rs (miner module entry point)
// - Submodules: cpu, error, stats

pub mod cpu;
pub mod error;
pub mod stats;

// Re-export key types for convenience
pub use cpu::{CpuMiner, JobSlot, MinerConfig};
pub use error::{ConfigError, MinerError};
pub use stats::MinerStats;

// Changelog:
// - v1.0.0 (2026-10-16): Miner module for the stratum miner.
//   - Added the error module; dropped the GPU module and per-thread stats.
