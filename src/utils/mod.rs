// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for utility functions in the stratum
// miner, located in the utils subdirectory. It declares submodules for shared
// utility logic used across the project.
//
// Tree Location:
// - src/utils/mod.rs (utils module entry point)
// - Submodules: address, format, user_agent

pub mod address;
pub mod format;
pub mod user_agent;

pub use address::{AddressError, validate_address};
pub use format::FormatUtils;
pub use user_agent::user_agent;

// Changelog:
// - v1.0.0 (2026-10-16): Utils module for the stratum miner.
//   - Added wallet address validation and exported the user agent helper.
