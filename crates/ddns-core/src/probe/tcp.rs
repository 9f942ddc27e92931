// # TCP Connectivity Probe
//
// Resolves a well-known always-up host and opens (then immediately drops) a
// TCP connection to it. Resolution and connect are each bounded by the probe
// timeout. Resolved addresses are tried in turn, IPv4 before IPv6, until one
// accepts.
//
// ## Failure Behavior
//
// - Resolution failure, empty resolution, refusal, timeout: `false`
// - Failures surface as `Error::Network` (logged at debug)
// - Nothing is retried; the next scheduler tick probes again

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use crate::traits::ConnectivityProbe;

/// TCP connect probe
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::probe::TcpProbe;
/// use ddns_core::traits::ConnectivityProbe;
///
/// #[tokio::main]
/// async fn main() {
///     let probe = TcpProbe::new("www.cloudflare.com", 80, std::time::Duration::from_secs(2));
///     println!("online: {}", probe.is_connected().await);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe for `host:port`
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Create a probe from configuration
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.host.clone(), config.port, config.timeout())
    }

    /// Resolve and connect, bounded by the timeout at each step
    async fn probe(&self) -> Result<()> {
        let lookup = tokio::net::lookup_host((self.host.as_str(), self.port));
        let mut addrs: Vec<SocketAddr> = bounded("resolution", self.timeout, lookup)
            .await?
            .collect();

        // IPv4 first, then IPv6, each in resolver order
        addrs.sort_by_key(|addr| !addr.is_ipv4());

        bounded("connect", self.timeout, connect_any(&addrs)).await
    }
}

/// Run one probe step; running past `limit` is a `TimedOut` network error
async fn bounded<T>(
    step: &str,
    limit: Duration,
    fut: impl Future<Output = io::Result<T>>,
) -> Result<T> {
    match timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Network(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("{} timed out after {:?}", step, limit),
        ))),
    }
}

/// Connect to the first reachable address; the stream is dropped at once
async fn connect_any(addrs: &[SocketAddr]) -> io::Result<()> {
    let mut last_error = None;

    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(_stream) => return Ok(()),
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "resolution returned no addresses")
    }))
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_connected(&self) -> bool {
        match self.probe().await {
            Ok(()) => true,
            Err(e) => {
                debug!("Connectivity probe to {} failed: {}", self.target(), e);
                false
            }
        }
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
