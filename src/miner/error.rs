// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/error.rs
// Version: 1.0.0
//
// Errors raised by the miner. Configuration errors are fatal at startup and
// mining never begins; runtime errors stop a running miner.

use crate::pool::StratumError;
use crate::utils::address::AddressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid thread count {count}: must be between 1 and {max}")]
    InvalidThreadCount { count: usize, max: usize },

    #[error(
        "mining threads is more than available CPUs, this is NOT optimal (threads: {requested}, max possible: {available})"
    )]
    TooManyThreads { requested: usize, available: usize },

    #[error("invalid wallet address: {0}")]
    Address(#[from] AddressError),

    #[error("invalid pool URL: {0}")]
    InvalidPool(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(&'static str),
}

#[derive(Debug, Error)]
pub enum MinerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stratum(#[from] StratumError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
