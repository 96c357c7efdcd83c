// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/protocol.rs
// Version: 1.0.0
//
// This file implements the stratum method vocabulary for communication with
// the mining pool, located in the pool subdirectory. It constructs the params
// objects for login, share submission and hashrate reports.
//
// Tree Location:
// - src/pool/protocol.rs (Stratum protocol logic)
// - Depends on: serde_json, crate::core::types

use crate::core::types::Share;
use log::debug;
use serde_json::{Value, json};

const LOG_TARGET: &str = "stratum_miner::pool::protocol";

/// Method names and params builders for the stratum protocol
pub struct StratumProtocol;

impl StratumProtocol {
    pub const LOGIN: &'static str = "login";
    pub const SUBMIT: &'static str = "submit";
    pub const REPORT_HASHRATE: &'static str = "reported_hashrate";
    pub const JOB: &'static str = "job";

    /// Params for the login request
    pub fn login_params(login: &str, pass: &str, agent: &str) -> Value {
        debug!(target: LOG_TARGET, "Building login params for {} (agent {})", login, agent);
        json!({
            "login": login,
            "pass": pass,
            "agent": agent
        })
    }

    /// Params for a share submission
    pub fn submit_params(session_id: &str, share: &Share) -> Value {
        json!({
            "id": session_id,
            "job_id": share.job_id,
            "nonce": share.nonce,
            "result": share.result
        })
    }

    /// Params for a hashrate report
    pub fn report_params(session_id: &str, hashrate: u64) -> Value {
        json!({
            "id": session_id,
            "hashrate": hashrate
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_params() {
        let params = StratumProtocol::login_params("dero1qy", "", "stratum-miner/1.0.0");
        assert_eq!(params, json!({"login": "dero1qy", "pass": "", "agent": "stratum-miner/1.0.0"}));
    }

    #[test]
    fn test_submit_params() {
        let share = Share::new("j1", "00ff", "abcd");
        let params = StratumProtocol::submit_params("session", &share);
        assert_eq!(params, json!({"id": "session", "job_id": "j1", "nonce": "00ff", "result": "abcd"}));
    }

    #[test]
    fn test_report_params() {
        let params = StratumProtocol::report_params("session", 12345);
        assert_eq!(params["hashrate"], 12345);
        assert_eq!(params["id"], "session");
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - Builders now return params only; framing and ids belong to the client.
//   - Added the reported_hashrate method and dropped the Stratum V1
//     subscribe/authorize messages.
