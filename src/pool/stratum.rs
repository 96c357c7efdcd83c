// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/stratum.rs
// Version: 1.0.0
//
// This file implements the stratum client engine, located in the pool
// subdirectory. It owns the connection state machine, the login handshake,
// the inbound dispatch task, the outbound call path and the reconnect loop,
// and fans jobs and responses out to any number of listeners.
//
// Lock order: `outbound` (async) before `state` before any other std mutex.
// No std mutex guard is held across an await point.
//
// Tree Location:
// - src/pool/stratum.rs (stratum protocol engine)
// - Depends on: tokio, tokio-util, serde_json, log

use crate::core::types::{Job, JobParams, Share};
use crate::pool::backoff::Backoff;
use crate::pool::broadcast::{Listener, Relay};
use crate::pool::client::{BoxedStream, Connector, PoolClient};
use crate::pool::error::{StratumError, StratumResult};
use crate::pool::messages::{Notification, PoolMessage, Request, Response, parse_pool_message};
use crate::pool::protocol::StratumProtocol;
use crate::utils::user_agent::user_agent;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "stratum_miner::pool::stratum";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

type Reader = BufReader<ReadHalf<BoxedStream>>;
type Writer = WriteHalf<BoxedStream>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Connected,
    /// Terminal; no further dials are attempted
    ClosedForever,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Closed => "closed",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::ClosedForever => "closed forever",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct StratumConfig {
    pub url: String,
    /// Wallet address sent as the login
    pub username: String,
    pub password: String,
    pub agent: String,
    pub insecure_skip_verify: bool,
    pub dial_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub reconnect_min: Duration,
    pub reconnect_max: Duration,
    pub reconnect_factor: f64,
}

impl Default for StratumConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            agent: user_agent(),
            insecure_skip_verify: false,
            dial_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            reconnect_min: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
            reconnect_factor: 1.5,
        }
    }
}

struct Outbound {
    next_id: u64,
    writer: Option<Writer>,
    /// Connection number the writer belongs to
    epoch: u64,
}

/// The inbound read task of the current connection
struct Dispatcher {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Dispatcher {
    fn stop(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

/// Successful login exchange, ready to be installed as the live connection
struct Session {
    reader: Reader,
    writer: Writer,
    id: String,
    job: Job,
}

pub struct StratumClient {
    config: StratumConfig,
    connector: Arc<dyn Connector>,
    shutdown: CancellationToken,
    state: Mutex<ConnectionState>,
    /// Submission lock: id allocation and the socket write happen under it
    outbound: AsyncMutex<Outbound>,
    session_id: Mutex<Option<String>>,
    /// Ids of share submissions awaiting a response on this connection
    pending: Mutex<HashSet<u64>>,
    /// Result hash of the last share handed to the pool
    last_share: Mutex<Option<String>>,
    accepted: AtomicU64,
    rejected: AtomicU64,
    connections: AtomicU64,
    dispatcher: Mutex<Option<Dispatcher>>,
    jobs: Relay<Arc<Job>>,
    responses: Relay<Arc<Response>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str, deadline: Duration) -> StratumResult<()> {
    let write = async {
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    };
    timeout(deadline, write).await.map_err(|_| StratumError::Timeout("write"))??;
    Ok(())
}

async fn read_line(reader: &mut Reader, line: &mut String, deadline: Duration) -> StratumResult<()> {
    let read = timeout(deadline, reader.read_line(line))
        .await
        .map_err(|_| StratumError::Timeout("read"))??;
    if read == 0 {
        return Err(StratumError::Disconnected);
    }
    Ok(())
}

impl StratumClient {
    /// Create a client that dials through `connector`. Cancelling `parent`
    /// stops every task the client owns.
    pub fn new(config: StratumConfig, connector: Arc<dyn Connector>, parent: &CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            config,
            connector,
            shutdown: parent.child_token(),
            state: Mutex::new(ConnectionState::Closed),
            outbound: AsyncMutex::new(Outbound {
                next_id: 0,
                writer: None,
                epoch: 0,
            }),
            session_id: Mutex::new(None),
            pending: Mutex::new(HashSet::new()),
            last_share: Mutex::new(None),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            connections: AtomicU64::new(0),
            dispatcher: Mutex::new(None),
            jobs: Relay::new("job"),
            responses: Relay::new("response"),
        })
    }

    /// Create a client that dials the configured URL over TCP or TLS
    pub fn from_config(config: StratumConfig, parent: &CancellationToken) -> StratumResult<Arc<Self>> {
        let connector = PoolClient::new(&config.url, config.dial_timeout, config.insecure_skip_verify)?;
        Ok(Self::new(config, Arc::new(connector), parent))
    }

    /// Single dial attempt. Returns immediately if a dial is already in
    /// flight or the client is connected.
    pub async fn dial(self: &Arc<Self>) -> StratumResult<()> {
        if !self.begin_connecting()? {
            return Ok(());
        }
        self.connect_once().await
    }

    /// Dial until connected or shut down, sleeping with exponential backoff
    /// between attempts. Only one caller runs the loop at a time.
    pub async fn dial_with_backoff(self: &Arc<Self>) -> StratumResult<()> {
        if !self.begin_connecting()? {
            return Ok(());
        }

        let mut backoff = Backoff::new(
            self.config.reconnect_min,
            self.config.reconnect_max,
            self.config.reconnect_factor,
        );
        loop {
            let err = match self.connect_once().await {
                Ok(()) => return Ok(()),
                Err(StratumError::Shutdown) => return Err(StratumError::Shutdown),
                Err(e) => e,
            };

            let delay = backoff.duration();
            if err.is_handshake() {
                warn!(target: LOG_TARGET, "Login to {} failed: {}, retrying in {:.1?}", self.config.url, err, delay);
            } else {
                warn!(target: LOG_TARGET, "Connection to {} failed: {}, retrying in {:.1?}", self.config.url, err, delay);
            }

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Err(StratumError::Shutdown),
                _ = sleep(delay) => {}
            }

            if !self.begin_connecting()? {
                return Ok(());
            }
        }
    }

    /// Tear down the live connection. `forever` makes the close terminal.
    pub async fn close(&self, forever: bool) {
        self.close_connection(forever, None).await;
    }

    /// Close, but only while connection number `epoch` is still the live one
    /// when `epoch` is given.
    async fn close_connection(&self, forever: bool, epoch: Option<u64>) {
        let mut outbound = self.outbound.lock().await;
        if let Some(stale) = epoch.filter(|&epoch| epoch != outbound.epoch) {
            debug!(target: LOG_TARGET, "Connection #{} already replaced, not closing", stale);
            return;
        }
        let previous = {
            let mut state = lock(&self.state);
            let previous = *state;
            match (previous, forever) {
                (ConnectionState::ClosedForever, _) => return,
                (_, true) => *state = ConnectionState::ClosedForever,
                (ConnectionState::Connected, false) => *state = ConnectionState::Closed,
                _ => return,
            }
            previous
        };

        let dispatcher = lock(&self.dispatcher).take();
        if let Some(dispatcher) = dispatcher {
            dispatcher.stop();
        }
        lock(&self.pending).clear();
        *lock(&self.session_id) = None;
        let writer = outbound.writer.take();
        drop(outbound);

        if let Some(mut writer) = writer {
            let _ = timeout(self.config.write_timeout, writer.shutdown()).await;
        }
        info!(target: LOG_TARGET, "Connection to {} closed (was {})", self.config.url, previous);
    }

    /// Close for good and stop every task owned by this client. Idempotent.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.close(true).await;
    }

    /// Submit a share. Returns the request id, or `None` when the share repeats
    /// the previous submission and was suppressed.
    pub async fn submit_share(self: &Arc<Self>, share: &Share) -> StratumResult<Option<u64>> {
        let session = self.session_id().ok_or(StratumError::NotConnected)?;
        let previous = {
            let mut last = lock(&self.last_share);
            if last.as_deref() == Some(share.result.as_str()) {
                debug!(target: LOG_TARGET, "Suppressing duplicate share for job {}", share.job_id);
                return Ok(None);
            }
            last.replace(share.result.clone())
        };

        let params = StratumProtocol::submit_params(&session, share);
        match self.call(StratumProtocol::SUBMIT, params, true).await {
            Ok(id) => {
                debug!(target: LOG_TARGET, "Submitted share for job {} as request {}", share.job_id, id);
                Ok(Some(id))
            }
            Err(e) => {
                // Only a share that reached the pool counts as submitted.
                let mut last = lock(&self.last_share);
                if last.as_deref() == Some(share.result.as_str()) {
                    *last = previous;
                }
                Err(e)
            }
        }
    }

    /// Report the local hashrate in hashes per second
    pub async fn report_hashrate(self: &Arc<Self>, hashrate: u64) -> StratumResult<u64> {
        let session = self.session_id().ok_or(StratumError::NotConnected)?;
        let params = StratumProtocol::report_params(&session, hashrate);
        self.call(StratumProtocol::REPORT_HASHRATE, params, false).await
    }

    /// Subscribe to jobs from the login response and `job` notifications
    pub fn job_listener(&self, buffer: usize) -> Listener<Arc<Job>> {
        self.jobs.listener(buffer)
    }

    /// Subscribe to every response received from the pool
    pub fn response_listener(&self, buffer: usize) -> Listener<Arc<Response>> {
        self.responses.listener(buffer)
    }

    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn session_id(&self) -> Option<String> {
        lock(&self.session_id).clone()
    }

    pub fn accepted_shares(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected_shares(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn total_shares(&self) -> u64 {
        self.accepted_shares() + self.rejected_shares()
    }

    /// Number of successful logins over the client's lifetime
    pub fn connection_count(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Test-and-set `Closed -> Connecting`. `Ok(false)` when another dial owns
    /// the connection.
    fn begin_connecting(&self) -> StratumResult<bool> {
        let mut state = lock(&self.state);
        match *state {
            ConnectionState::ClosedForever => Err(StratumError::Shutdown),
            ConnectionState::Connecting | ConnectionState::Connected => Ok(false),
            ConnectionState::Closed => {
                *state = ConnectionState::Connecting;
                Ok(true)
            }
        }
    }

    async fn connect_once(self: &Arc<Self>) -> StratumResult<()> {
        info!(target: LOG_TARGET, "Connecting to {}", self.config.url);
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(StratumError::Shutdown),
            session = self.login() => session,
        };

        match result {
            Ok(session) => self.install(session).await,
            Err(e) => {
                let mut state = lock(&self.state);
                if *state != ConnectionState::ClosedForever {
                    *state = ConnectionState::Closed;
                }
                Err(e)
            }
        }
    }

    /// Open a transport, send the login and wait for exactly one response line
    async fn login(&self) -> StratumResult<Session> {
        let stream = self.connector.connect().await?;
        let (read_half, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);

        let id = {
            let mut outbound = self.outbound.lock().await;
            outbound.next_id += 1;
            outbound.next_id
        };
        let params = StratumProtocol::login_params(&self.config.username, &self.config.password, &self.config.agent);
        let line = Request::new(id, StratumProtocol::LOGIN, Some(params)).to_line()?;
        write_line(&mut writer, &line, self.config.write_timeout).await?;

        let mut reply = String::new();
        read_line(&mut reader, &mut reply, self.config.read_timeout).await?;
        let response: Response = serde_json::from_str(reply.trim())?;
        if let Some(err) = response.error {
            return Err(StratumError::Pool(err));
        }

        let result = response.result.unwrap_or(Value::Null);
        let session_id = result
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(StratumError::NoSessionId)?
            .to_string();
        let job = match result.get("job") {
            None | Some(Value::Null) => return Err(StratumError::NoJob),
            Some(job) => job.clone(),
        };
        let params: JobParams = serde_json::from_value(job).map_err(|e| StratumError::InvalidJob(e.to_string()))?;
        let job = Job::try_from(params)?;

        Ok(Session {
            reader,
            writer,
            id: session_id,
            job,
        })
    }

    /// Publish a logged-in session as the live connection
    async fn install(self: &Arc<Self>, session: Session) -> StratumResult<()> {
        let Session { reader, writer, id, job } = session;
        let mut outbound = self.outbound.lock().await;
        {
            let mut state = lock(&self.state);
            if *state == ConnectionState::ClosedForever {
                return Err(StratumError::Shutdown);
            }
            *state = ConnectionState::Connected;
        }
        let count = self.connections.fetch_add(1, Ordering::Relaxed) + 1;
        outbound.writer = Some(writer);
        outbound.epoch = count;
        lock(&self.pending).clear();
        *lock(&self.session_id) = Some(id.clone());
        self.spawn_dispatcher(reader, count);
        drop(outbound);

        info!(target: LOG_TARGET,
            "Logged in to {} (session {}, connection #{})",
            self.config.url, id, count
        );
        info!(target: LOG_TARGET,
            "New job {} at height {} (difficulty {})",
            job.id, job.height, job.difficulty
        );
        self.jobs.notify(Arc::new(job));
        Ok(())
    }

    fn spawn_dispatcher(self: &Arc<Self>, reader: Reader, epoch: u64) {
        let token = self.shutdown.child_token();
        let handle = tokio::spawn(Arc::clone(self).dispatch(reader, token.clone(), epoch));
        let previous = lock(&self.dispatcher).replace(Dispatcher { token, handle });
        if let Some(previous) = previous {
            previous.stop();
        }
    }

    async fn dispatch(self: Arc<Self>, mut reader: Reader, token: CancellationToken, epoch: u64) {
        let mut line = String::new();
        loop {
            line.clear();
            let read = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                read = read_line(&mut reader, &mut line, self.config.read_timeout) => read,
            };

            match read {
                Ok(()) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        self.handle_line(trimmed);
                    }
                }
                Err(e) => {
                    if !token.is_cancelled() {
                        warn!(target: LOG_TARGET, "Lost connection to {}: {}", self.config.url, e);
                        self.close_and_reconnect(epoch);
                    }
                    return;
                }
            }
        }
    }

    fn handle_line(&self, line: &str) {
        match parse_pool_message(line) {
            Ok(PoolMessage::Response(response)) => self.handle_response(response),
            Ok(PoolMessage::Notification(notification)) => self.handle_notification(notification),
            Err(e) => warn!(target: LOG_TARGET, "Skipping malformed message ({}): {}", e, line),
        }
    }

    fn handle_response(&self, response: Response) {
        let tracked = response.id.is_some_and(|id| lock(&self.pending).remove(&id));
        if tracked {
            if response.is_error() {
                let total = self.rejected.fetch_add(1, Ordering::Relaxed) + 1;
                let reason = response.error.as_ref().map_or("null result", |e| e.message.as_str());
                debug!(target: LOG_TARGET, "Share rejected: {} (rejected {})", reason, total);
            } else {
                let total = self.accepted.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(target: LOG_TARGET, "Share accepted (accepted {})", total);
            }
        } else if let Some(status) = response.status() {
            debug!(target: LOG_TARGET, "Pool acknowledged request {:?}: {}", response.id, status);
        } else if let Some(err) = &response.error {
            error!(target: LOG_TARGET, "Pool returned an error for request {:?}: {}", response.id, err);
        } else {
            debug!(target: LOG_TARGET, "Ignoring untracked response {:?}", response.id);
        }
        self.responses.notify(Arc::new(response));
    }

    fn handle_notification(&self, notification: Notification) {
        if notification.method != StratumProtocol::JOB {
            debug!(target: LOG_TARGET, "Ignoring notification '{}'", notification.method);
            return;
        }

        let job = serde_json::from_value::<JobParams>(notification.params)
            .map_err(StratumError::from)
            .and_then(|params| Job::try_from(params).map_err(StratumError::from));
        match job {
            Ok(job) => {
                info!(target: LOG_TARGET,
                    "New job {} at height {} (difficulty {})",
                    job.id, job.height, job.difficulty
                );
                self.jobs.notify(Arc::new(job));
            }
            Err(e) => warn!(target: LOG_TARGET, "Skipping malformed job notification: {}", e),
        }
    }

    /// Send one request on the live connection
    async fn call(self: &Arc<Self>, method: &str, params: Value, track: bool) -> StratumResult<u64> {
        let mut outbound = self.outbound.lock().await;
        if outbound.writer.is_none() || !self.is_connected() {
            return Err(StratumError::NotConnected);
        }

        outbound.next_id += 1;
        let id = outbound.next_id;
        let line = Request::new(id, method, Some(params)).to_line()?;
        if track {
            lock(&self.pending).insert(id);
        }

        let epoch = outbound.epoch;
        let Some(writer) = outbound.writer.as_mut() else {
            return Err(StratumError::NotConnected);
        };
        if let Err(e) = write_line(writer, &line, self.config.write_timeout).await {
            if track {
                lock(&self.pending).remove(&id);
            }
            outbound.writer = None;
            drop(outbound);
            warn!(target: LOG_TARGET, "Failed to send {} request {}: {}", method, id, e);
            self.close_and_reconnect(epoch);
            return Err(e);
        }
        Ok(id)
    }

    /// Drop connection number `epoch` and dial again. A no-op close when a
    /// newer connection has already replaced it.
    fn close_and_reconnect(self: &Arc<Self>, epoch: u64) {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            client.close_connection(false, Some(epoch)).await;
            match client.dial_with_backoff().await {
                Ok(()) => {}
                Err(StratumError::Shutdown) => debug!(target: LOG_TARGET, "Reconnect abandoned: client shut down"),
                Err(e) => error!(target: LOG_TARGET, "Reconnect failed: {}", e),
            }
        });
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Stratum client engine.
//   - Connection state machine with a guarded dial, login handshake and a
//     replaceable dispatch task per connection.
//   - Outbound calls share one submission lock for id allocation and writes.
//   - Reconnect loop with exponential backoff and jitter, stopped by shutdown.
//   - Job and response relays with per-listener bounded buffers.
