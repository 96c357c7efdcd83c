// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/error.rs
// Version: 1.0.0
//
// Error type for the pool client. Transport problems, protocol decode failures
// and handshake failures are kept distinct so callers can tell a dead socket
// from a pool that answered the login with something unusable.

use crate::core::difficulty::TargetError;
use crate::pool::messages::RpcError;
use thiserror::Error;

pub type StratumResult<T> = Result<T, StratumError>;

#[derive(Debug, Error)]
pub enum StratumError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("invalid pool URL: {0}")]
    InvalidUrl(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("not connected")]
    NotConnected,

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("connection closed by pool")]
    Disconnected,

    #[error("login response carried no session id")]
    NoSessionId,

    #[error("login response carried no job")]
    NoJob,

    #[error("login response carried an invalid job: {0}")]
    InvalidJob(String),

    #[error("pool error: {0}")]
    Pool(#[from] RpcError),

    #[error("client shut down")]
    Shutdown,
}

impl StratumError {
    /// True for failures of the login exchange itself rather than the transport
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            StratumError::NoSessionId | StratumError::NoJob | StratumError::InvalidJob(_) | StratumError::Pool(_)
        )
    }
}

impl From<TargetError> for StratumError {
    fn from(err: TargetError) -> Self {
        StratumError::InvalidJob(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_classification() {
        assert!(StratumError::NoSessionId.is_handshake());
        assert!(StratumError::NoJob.is_handshake());
        assert!(StratumError::from(TargetError::Zero).is_handshake());
        assert!(!StratumError::Timeout("read").is_handshake());
        assert!(!StratumError::Disconnected.is_handshake());
    }
}
