//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ConnectivityProbe`]: Gate a cycle on outbound network access
//! - [`IpSource`]: Discover the current public IP
//! - [`DnsProvider`]: Read and write records via provider APIs
//! - [`Reporter`]: Receive cycle outcomes

pub mod connectivity;
pub mod ip_source;
pub mod dns_provider;
pub mod reporter;

pub use connectivity::ConnectivityProbe;
pub use ip_source::{IpSource, IpFamily, PublicIp};
pub use dns_provider::{DnsProvider, DnsRecord, RecordUpdate};
pub use reporter::Reporter;
