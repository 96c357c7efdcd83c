// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/messages.rs
// Version: 1.0.0
//
// This file defines the wire messages exchanged with the pool and the decoder
// that classifies an inbound line as a response or a notification, located in
// the pool subdirectory.
//
// Tree Location:
// - src/pool/messages.rs (wire codec)
// - Depends on: serde, serde_json, thiserror

use crate::pool::error::StratumError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// Client request. Field order is the serialised order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }

    /// Serialise as one newline-terminated line
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Error object carried by a response
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub traceback: Value,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl Response {
    /// A response counts as a rejection when it carries an error or a null result.
    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.result.as_ref().is_none_or(Value::is_null)
    }

    /// Optional `status` field of an object result, e.g. `"OK"`
    pub fn status(&self) -> Option<&str> {
        self.result.as_ref()?.get("status")?.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// An inbound line after classification
#[derive(Debug, Clone, PartialEq)]
pub enum PoolMessage {
    Response(Response),
    Notification(Notification),
}

/// Classify and decode one inbound line.
///
/// A numeric `id` makes the line a response. A missing or null `id` together
/// with a string `method` makes it a notification. Every other shape is
/// rejected.
pub fn parse_pool_message(line: &str) -> Result<PoolMessage, StratumError> {
    let value: Value = serde_json::from_str(line)?;
    let object = value
        .as_object()
        .ok_or_else(|| StratumError::InvalidMessage("expected a JSON object".to_string()))?;

    match object.get("id") {
        Some(Value::Number(n)) if n.is_u64() => Ok(PoolMessage::Response(serde_json::from_value(value)?)),
        None | Some(Value::Null) => match object.get("method") {
            Some(Value::String(_)) => Ok(PoolMessage::Notification(serde_json::from_value(value)?)),
            _ => Err(StratumError::InvalidMessage("message has neither id nor method".to_string())),
        },
        Some(other) => Err(StratumError::InvalidMessage(format!("unsupported id {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialisation_is_exact() {
        let line = Request::new(1, "getwork", None).to_line().unwrap();
        assert_eq!(line, "{\"id\":1,\"jsonrpc\":\"2.0\",\"method\":\"getwork\",\"params\":null}\n");
    }

    #[test]
    fn test_request_with_params() {
        let line = Request::new(7, "submit", Some(json!({"id": "s"}))).to_line().unwrap();
        assert_eq!(line, "{\"id\":7,\"jsonrpc\":\"2.0\",\"method\":\"submit\",\"params\":{\"id\":\"s\"}}\n");
    }

    #[test]
    fn test_parse_response() {
        let msg = parse_pool_message(r#"{"id":3,"result":{"status":"OK"},"error":null}"#).unwrap();
        match msg {
            PoolMessage::Response(resp) => {
                assert_eq!(resp.id, Some(3));
                assert!(!resp.is_error());
                assert_eq!(resp.status(), Some("OK"));
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_error_and_null_results_are_rejections() {
        let PoolMessage::Response(resp) = parse_pool_message(
            r#"{"id":4,"result":null,"error":{"code":-1,"message":"Low difficulty share","traceback":null}}"#,
        )
        .unwrap() else {
            panic!("expected response");
        };
        assert!(resp.is_error());
        assert_eq!(resp.error.as_ref().map(|e| e.message.as_str()), Some("Low difficulty share"));

        let PoolMessage::Response(resp) = parse_pool_message(r#"{"id":5,"result":null}"#).unwrap() else {
            panic!("expected response");
        };
        assert!(resp.is_error());
        assert_eq!(resp.status(), None);
    }

    #[test]
    fn test_parse_notification() {
        let msg = parse_pool_message(r#"{"jsonrpc":"2.0","method":"job","params":{"job_id":"1"}}"#).unwrap();
        match msg {
            PoolMessage::Notification(n) => {
                assert_eq!(n.method, "job");
                assert_eq!(n.params["job_id"], "1");
            }
            other => panic!("expected notification, got {:?}", other),
        }

        let msg = parse_pool_message(r#"{"id":null,"method":"job","params":{}}"#).unwrap();
        assert!(matches!(msg, PoolMessage::Notification(_)));
    }

    #[test]
    fn test_malformed_lines_fail_closed() {
        assert!(matches!(parse_pool_message("not json"), Err(StratumError::Json(_))));
        assert!(matches!(parse_pool_message("[1,2]"), Err(StratumError::InvalidMessage(_))));
        assert!(matches!(parse_pool_message(r#"{"id":"abc","result":{}}"#), Err(StratumError::InvalidMessage(_))));
        assert!(matches!(parse_pool_message(r#"{"params":{}}"#), Err(StratumError::InvalidMessage(_))));
        assert!(matches!(parse_pool_message(r#"{"method":7}"#), Err(StratumError::InvalidMessage(_))));
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Typed wire codec.
//   - Request, Response, RpcError and Notification replace ad hoc JSON values.
//   - parse_pool_message classifies lines by their id field and rejects
//     unknown shapes with an explicit error.
