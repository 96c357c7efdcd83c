// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for the core functionality of the
// stratum miner, located in the core subdirectory. It declares submodules and
// re-exports key types for use throughout the project.

pub mod difficulty;
pub mod pow;
pub mod types;
pub mod work;

// Re-export the most commonly used items
pub use difficulty::{HASH_SIZE, TargetError, check_pow_hash, difficulty_threshold, parse_target_difficulty};
pub use pow::{PowHasher, TripleSha3};
pub use types::{Args, Job, JobParams, Share};
pub use work::{WorkBuffer, WorkError};

// Changelog:
// - v1.0.0 (2026-10-16): Core module for the stratum miner.
//   - Added pow and work modules; dropped the sha256 and sha3x helpers.
