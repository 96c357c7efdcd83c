// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for the pool communication functionality
// of the stratum miner, located in the pool subdirectory. It declares submodules
// and re-exports key types for use throughout the project.
//
// Tree Location:
// - src/pool/mod.rs (pool module entry point)
// - Submodules: backoff, broadcast, client, error, messages, protocol, stratum, tls

pub mod backoff;
pub mod broadcast;
pub mod client;
pub mod error;
pub mod messages;
pub mod protocol;
pub mod stratum;
pub mod tls;

// Re-export key types for convenience
pub use client::{BoxedStream, ConnectFuture, Connector, PoolClient, PoolEndpoint};
pub use error::{StratumError, StratumResult};
pub use messages::{PoolMessage, Request, Response, RpcError};
pub use stratum::{ConnectionState, StratumClient, StratumConfig};

// Changelog:
// - v1.0.0 (2026-10-16): Pool module for the stratum miner.
//   - Added the stratum engine, backoff, broadcast, error and TLS submodules.
