// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/common/mod.rs
// Version: 1.0.0
//
// Shared harness for the integration tests: an in-memory connector that hands
// the pool side of every connection to the test, and a scripted pool peer.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stratum_miner::pool::{ConnectFuture, Connector, StratumClient, StratumConfig, StratumError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const WALLET: &str = "dero1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5z5tpwxqergd3c8g7ruszzgs9jezes";
pub const EASY_TARGET: &str = "ffffffffffffffff";
pub const WAIT: Duration = Duration::from_secs(5);

/// Connector whose first `failures` attempts are refused. Every successful
/// attempt sends the pool end of an in-memory pipe to the test.
pub struct ScriptedConnector {
    failures: AtomicUsize,
    attempts: AtomicUsize,
    servers: mpsc::UnboundedSender<DuplexStream>,
}

impl ScriptedConnector {
    pub fn new(failures: usize) -> (Arc<Self>, mpsc::UnboundedReceiver<DuplexStream>) {
        let (servers, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
            servers,
        });
        (connector, rx)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self) -> ConnectFuture<'_> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let refused = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if refused {
                return Err(StratumError::Io(std::io::ErrorKind::ConnectionRefused.into()));
            }

            let (client, server) = tokio::io::duplex(64 * 1024);
            self.servers
                .send(server)
                .map_err(|_| StratumError::Io(std::io::ErrorKind::BrokenPipe.into()))?;
            Ok(Box::new(client) as stratum_miner::pool::BoxedStream)
        })
    }
}

pub fn test_config() -> StratumConfig {
    StratumConfig {
        url: "stratum+tcp://pool.test:10100".into(),
        username: WALLET.into(),
        password: "x".into(),
        agent: "stratum-miner-test".into(),
        read_timeout: Duration::from_secs(5),
        write_timeout: Duration::from_secs(5),
        reconnect_min: Duration::from_millis(10),
        reconnect_max: Duration::from_millis(40),
        reconnect_factor: 2.0,
        ..StratumConfig::default()
    }
}

pub fn scripted_client(
    failures: usize,
    config: StratumConfig,
) -> (
    Arc<StratumClient>,
    Arc<ScriptedConnector>,
    mpsc::UnboundedReceiver<DuplexStream>,
    CancellationToken,
) {
    let (connector, servers) = ScriptedConnector::new(failures);
    let cancel = CancellationToken::new();
    let client = StratumClient::new(config, connector.clone(), &cancel);
    (client, connector, servers, cancel)
}

pub fn job_params(job_id: &str, height: u64, target: &str) -> Value {
    json!({
        "job_id": job_id,
        "blob": format!("01{}", "00".repeat(47)),
        "height": height,
        "extra_nonce": "",
        "pool_wallet": "",
        "target": target
    })
}

pub fn login_ok(id: u64, session: &str, job: Value) -> Value {
    json!({
        "id": id,
        "jsonrpc": "2.0",
        "result": { "id": session, "job": job, "status": "OK" },
        "error": null
    })
}

/// The pool end of one connection
pub struct PoolPeer {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl PoolPeer {
    pub fn new(stream: DuplexStream) -> Self {
        let (read, writer) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    /// Wait for the next connection the client opens
    pub async fn accept(servers: &mut mpsc::UnboundedReceiver<DuplexStream>) -> Self {
        let stream = tokio::time::timeout(WAIT, servers.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("connector dropped");
        Self::new(stream)
    }

    pub async fn read_request(&mut self) -> Value {
        let mut line = String::new();
        let read = tokio::time::timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a request")
            .expect("read failed");
        assert!(read > 0, "client closed the connection");
        assert!(line.ends_with('\n'), "request is not newline terminated");
        serde_json::from_str(line.trim()).expect("request is not JSON")
    }

    /// Next request whose method is `method`, skipping everything else
    pub async fn read_method(&mut self, method: &str) -> Value {
        loop {
            let request = self.read_request().await;
            if request["method"] == method {
                return request;
            }
        }
    }

    pub async fn send(&mut self, message: Value) {
        let mut line = message.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.expect("write failed");
        self.writer.flush().await.expect("flush failed");
    }

    /// Answer the login request with a session and a job
    pub async fn accept_login(&mut self, session: &str, job: Value) -> Value {
        let login = self.read_request().await;
        assert_eq!(login["method"], "login");
        let id = login["id"].as_u64().expect("login id");
        self.send(login_ok(id, session, job)).await;
        login
    }
}

/// Poll `condition` until it holds or `WAIT` elapses
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
