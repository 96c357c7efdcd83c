// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/client.rs
// Version: 1.0.0
//
// This file implements the transport used to reach the mining pool, located in
// the pool subdirectory. It parses pool URLs, resolves addresses and opens
// plain TCP or TLS streams behind the Connector trait.
//
// Tree Location:
// - src/pool/client.rs (pool transport)
// - Depends on: tokio, tokio-rustls

use crate::pool::error::{StratumError, StratumResult};
use crate::pool::tls::build_connector;
use log::debug;
use rustls::pki_types::ServerName;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpSocket, TcpStream, lookup_host};
use tokio::time::timeout;
use tokio_rustls::TlsConnector;

const LOG_TARGET: &str = "stratum_miner::pool::client";

/// Any duplex byte stream the client can speak stratum over
pub trait PoolStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> PoolStream for T {}

pub type BoxedStream = Box<dyn PoolStream>;

pub type ConnectFuture<'a> = Pin<Box<dyn Future<Output = StratumResult<BoxedStream>> + Send + 'a>>;

/// Opens a fresh stream to the pool for every dial attempt
pub trait Connector: Send + Sync {
    fn connect(&self) -> ConnectFuture<'_>;
}

/// Where to dial and whether to wrap the stream in TLS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEndpoint {
    /// Host name or IP without brackets, used for SNI
    pub host: String,
    /// `host:port` as given, used for resolution
    pub address: String,
    pub tls: bool,
}

impl PoolEndpoint {
    /// Parse `[scheme://]host:port`
    pub fn parse(url: &str) -> StratumResult<Self> {
        let url = url.trim();
        let (tls, rest) = match url.split_once("://") {
            Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
                "stratum+tls" | "stratum+ssl" => (true, rest),
                "stratum" | "stratum+tcp" | "tcp" => (false, rest),
                other => return Err(StratumError::InvalidUrl(format!("unsupported scheme '{}'", other))),
            },
            None => (false, url),
        };

        let address = rest.trim_end_matches('/');
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| StratumError::InvalidUrl(format!("'{}' is not host:port", address)))?;

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(StratumError::InvalidUrl(format!("'{}' has no host", address)));
        }
        match port.parse::<u16>() {
            Ok(p) if p > 0 => {}
            _ => return Err(StratumError::InvalidUrl(format!("invalid port '{}'", port))),
        }

        Ok(Self {
            host: host.to_string(),
            address: address.to_string(),
            tls,
        })
    }
}

/// Production connector: TCP with keepalive and nodelay, optionally TLS
#[derive(Clone)]
pub struct PoolClient {
    endpoint: PoolEndpoint,
    dial_timeout: Duration,
    tls: Option<TlsConnector>,
}

impl PoolClient {
    pub fn new(url: &str, dial_timeout: Duration, insecure_skip_verify: bool) -> StratumResult<Self> {
        let endpoint = PoolEndpoint::parse(url)?;
        let tls = if endpoint.tls {
            Some(build_connector(insecure_skip_verify)?)
        } else {
            None
        };
        Ok(Self {
            endpoint,
            dial_timeout,
            tls,
        })
    }

    pub fn endpoint(&self) -> &PoolEndpoint {
        &self.endpoint
    }

    /// Resolve pool address from either IP:port or domain:port format
    async fn resolve_pool_address(pool_str: &str) -> StratumResult<SocketAddr> {
        if let Ok(addr) = pool_str.parse::<SocketAddr>() {
            return Ok(addr);
        }

        let mut addrs = lookup_host(pool_str).await?;
        addrs
            .next()
            .ok_or_else(|| StratumError::InvalidUrl(format!("no addresses found for {}", pool_str)))
    }

    async fn connect_tcp(&self) -> StratumResult<TcpStream> {
        let addr = Self::resolve_pool_address(&self.endpoint.address).await?;
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_keepalive(true)?;
        let stream = socket.connect(addr).await?;
        stream.set_nodelay(true)?; // Disable Nagle's algorithm for low latency
        debug!(target: LOG_TARGET, "Connected to {} ({})", self.endpoint.address, addr);
        Ok(stream)
    }

    async fn dial(&self) -> StratumResult<BoxedStream> {
        let stream = self.connect_tcp().await?;
        match &self.tls {
            Some(connector) => {
                let server_name = ServerName::try_from(self.endpoint.host.clone())
                    .map_err(|e| StratumError::InvalidUrl(e.to_string()))?;
                let tls_stream = connector.connect(server_name, stream).await?;
                debug!(target: LOG_TARGET, "TLS handshake with {} complete", self.endpoint.host);
                Ok(Box::new(tls_stream))
            }
            None => Ok(Box::new(stream)),
        }
    }
}

impl Connector for PoolClient {
    fn connect(&self) -> ConnectFuture<'_> {
        Box::pin(async move {
            timeout(self.dial_timeout, self.dial())
                .await
                .map_err(|_| StratumError::Timeout("dial"))?
        })
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - Added PoolEndpoint URL parsing with scheme-based TLS selection.
//   - PoolClient now implements Connector and returns boxed plain or TLS
//     streams, with keepalive, nodelay and a dial timeout.
