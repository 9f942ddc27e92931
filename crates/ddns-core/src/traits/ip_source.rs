// # IP Source Trait
//
// Defines the interface for discovering the host's public IP address.
//
// ## Implementations
//
// - HTTP IP-check services with ordered fallback: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> ddns_core::Result<()> {
//     let source = /* IpSource implementation */;
//
//     // Resolved fresh on every call
//     let ip = source.current().await?;
//     println!("public IP: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// The externally visible address of this host
///
/// Resolved once per cycle and never persisted between cycles; the
/// reconciler always compares it against the provider's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicIp(IpAddr);

impl PublicIp {
    /// Wrap an address
    pub fn new(ip: IpAddr) -> Self {
        Self(ip)
    }

    /// The underlying address
    pub fn addr(&self) -> IpAddr {
        self.0
    }

    /// Whether a record's content already points at this address
    ///
    /// Content that parses as an address is compared by value, so `::1` and
    /// `0:0:0:0:0:0:0:1` are equal. Anything else falls back to text equality.
    pub fn matches(&self, content: &str) -> bool {
        let content = content.trim();
        match content.parse::<IpAddr>() {
            Ok(ip) => ip == self.0,
            Err(_) => content == self.0.to_string(),
        }
    }

    /// Address family of this IP
    pub fn family(&self) -> IpFamily {
        match self.0 {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }
}

impl From<IpAddr> for PublicIp {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl FromStr for PublicIp {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.parse::<IpAddr>()
            .map(Self)
            .map_err(|_| crate::Error::invalid_input(format!("not an IP address: {:?}", s)))
    }
}

impl fmt::Display for PublicIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Address family accepted from IP-check services
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    /// Whatever the service reports
    #[default]
    Any,
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
}

impl IpFamily {
    /// Whether `ip` belongs to this family
    pub fn accepts(&self, ip: &PublicIp) -> bool {
        match self {
            IpFamily::Any => true,
            IpFamily::V4 => ip.addr().is_ipv4(),
            IpFamily::V6 => ip.addr().is_ipv6(),
        }
    }
}

impl FromStr for IpFamily {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "both" | "" => Ok(IpFamily::Any),
            "v4" | "ipv4" => Ok(IpFamily::V4),
            "v6" | "ipv6" => Ok(IpFamily::V6),
            other => Err(crate::Error::config(format!(
                "unknown IP family '{}' (expected any, v4 or v6)",
                other
            ))),
        }
    }
}

/// Trait for public IP discovery
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Rules
///
/// - Query fresh on every call; no caching across calls
/// - Bound every network attempt with a timeout
/// - Do not retry beyond the implementation's own fallback list; the
///   scheduler's next tick is the retry
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(PublicIp)`: The first usable answer
    /// - `Err(Error)`: No usable answer; the caller skips the cycle
    async fn current(&self) -> Result<PublicIp, crate::Error>;

    /// Short description used in log lines (e.g., "http (4 services)")
    fn describe(&self) -> String;
}
