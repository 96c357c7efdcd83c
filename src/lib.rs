// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 1.0.0
//
// This file serves as the main library entry point for the stratum miner,
// located at the root of the source tree. It exports all public modules
// and types that the binary and the integration tests use.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: core, logging, miner, pool, utils

pub mod core;
pub mod logging;
pub mod miner;
pub mod pool;
pub mod utils;

// Re-export commonly used types at the crate root for convenience
pub use crate::core::{Args, Job, Share, TripleSha3};
pub use crate::logging::LogSettings;
pub use crate::miner::{CpuMiner, MinerConfig, MinerStats};
pub use crate::pool::{StratumClient, StratumConfig};

// Changelog:
// - v1.0.0 (2026-10-16): Library root for the stratum miner.
//   - Added the logging module; dropped benchmark, help and the optional TUI.
//   - Removed the boxed `Result` alias in favour of per-module error types.
