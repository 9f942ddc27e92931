//! Configuration types for the DDNS system
//!
//! The configuration is built once at process start and handed to each
//! component by value or reference. Nothing in it changes at runtime.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::traits::IpFamily;

/// Cloudflare API base URL
pub const DEFAULT_CLOUDFLARE_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// IP-check services queried in order, first usable answer wins
pub const DEFAULT_IP_CHECK_SERVICES: &[&str] = &[
    "https://adresameaip.ro/ip",
    "https://api.ipify.org",
    "https://icanhazip.com",
    "https://ipinfo.io/ip",
];

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public IP discovery settings
    #[serde(default)]
    pub ip_check: IpCheckConfig,

    /// Connectivity probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Domains to keep in sync, processed in this order
    pub domains: Vec<DomainTarget>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything but the provider
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            ip_check: IpCheckConfig::default(),
            probe: ProbeConfig::default(),
            domains: Vec::new(),
            engine: EngineConfig::default(),
        }
    }

    /// Add a domain to the managed list
    pub fn with_domain(mut self, domain: DomainTarget) -> Self {
        self.domains.push(domain);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domains.is_empty() {
            return Err(crate::Error::config("No domains configured"));
        }

        for domain in &self.domains {
            domain.validate()?;
        }

        self.provider.validate()?;
        self.ip_check.validate()?;
        self.probe.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    ///
    /// Authenticate with either `email` + `api_key` (global key) or
    /// `api_token` (scoped token).
    Cloudflare {
        /// Account email, sent as `X-Auth-Email`
        #[serde(default)]
        email: Option<String>,
        /// Global API key, sent as `X-Auth-Key`
        #[serde(default)]
        api_key: Option<String>,
        /// Scoped API token, sent as a bearer token
        #[serde(default)]
        api_token: Option<String>,
        /// API base URL
        #[serde(default = "default_cloudflare_base_url")]
        base_url: String,
        /// Per-request timeout in seconds
        #[serde(default = "default_provider_timeout_secs")]
        timeout_secs: u64,
        /// Read records but only log the writes
        #[serde(default)]
        dry_run: bool,
    },
}

impl ProviderConfig {
    /// Cloudflare configuration using email + global API key
    pub fn cloudflare_global(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            email: Some(email.into()),
            api_key: Some(api_key.into()),
            api_token: None,
            base_url: default_cloudflare_base_url(),
            timeout_secs: default_provider_timeout_secs(),
            dry_run: false,
        }
    }

    /// Cloudflare configuration using a scoped API token
    pub fn cloudflare_token(api_token: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            email: None,
            api_key: None,
            api_token: Some(api_token.into()),
            base_url: default_cloudflare_base_url(),
            timeout_secs: default_provider_timeout_secs(),
            dry_run: false,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                email,
                api_key,
                api_token,
                base_url,
                timeout_secs,
                ..
            } => {
                let global = matches!(
                    (email, api_key),
                    (Some(e), Some(k)) if !e.is_empty() && !k.is_empty()
                );
                let token = api_token.as_ref().is_some_and(|t| !t.is_empty());
                if !global && !token {
                    return Err(crate::Error::config(
                        "Cloudflare credentials missing: set email + api_key or api_token",
                    ));
                }
                if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "Cloudflare base URL must be http(s): {}",
                        base_url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Provider timeout must be > 0"));
                }
                Ok(())
            }
        }
    }

}

// Credentials never reach Debug output
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                email,
                api_key,
                api_token,
                base_url,
                timeout_secs,
                dry_run,
            } => f
                .debug_struct("Cloudflare")
                .field("email", &email.as_ref().map(|_| "<REDACTED>"))
                .field("api_key", &api_key.as_ref().map(|_| "<REDACTED>"))
                .field("api_token", &api_token.as_ref().map(|_| "<REDACTED>"))
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .field("dry_run", dry_run)
                .finish(),
        }
    }
}

/// Public IP discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpCheckConfig {
    /// Service URLs in priority order
    #[serde(default = "default_ip_check_services")]
    pub services: Vec<String>,

    /// Per-service timeout in seconds
    #[serde(default = "default_ip_check_timeout_secs")]
    pub timeout_secs: u64,

    /// Address family to accept
    #[serde(default)]
    pub family: IpFamily,
}

impl IpCheckConfig {
    /// Per-service timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the IP check configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.services.is_empty() {
            return Err(crate::Error::config("At least one IP check service is required"));
        }
        for url in &self.services {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "IP check service must use HTTP or HTTPS scheme: {}",
                    url
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("IP check timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for IpCheckConfig {
    fn default() -> Self {
        Self {
            services: default_ip_check_services(),
            timeout_secs: default_ip_check_timeout_secs(),
            family: IpFamily::default(),
        }
    }
}

/// Connectivity probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Always-up host belonging to the provider
    #[serde(default = "default_probe_host")]
    pub host: String,

    /// TCP port to connect to
    #[serde(default = "default_probe_port")]
    pub port: u16,

    /// Timeout for resolution and for the connect, in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProbeConfig {
    /// Probe timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the probe configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host.is_empty() {
            return Err(crate::Error::config("Probe host cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::Error::config("Probe port must be > 0"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Probe timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: default_probe_host(),
            port: default_probe_port(),
            timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// A domain kept in sync with the public IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTarget {
    /// Zone the record lives in
    pub zone_id: String,

    /// Fully qualified record name (e.g., "home.example.com")
    pub name: String,

    /// Proxy flag written on update
    #[serde(default = "default_proxied")]
    pub proxied: bool,
}

impl DomainTarget {
    /// Create a new domain target
    pub fn new(zone_id: impl Into<String>, name: impl Into<String>, proxied: bool) -> Self {
        Self {
            zone_id: zone_id.into(),
            name: name.into(),
            proxied,
        }
    }

    /// Validate the domain target
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id.trim().is_empty() {
            return Err(crate::Error::config(format!(
                "Zone ID missing for domain {}",
                self.name
            )));
        }
        if self.name.trim().is_empty() {
            return Err(crate::Error::config("Domain name cannot be empty"));
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Time between the starts of consecutive cycles, in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// TTL written with every update, in seconds
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,
}

impl EngineConfig {
    /// Cycle interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Cycle interval must be > 0"));
        }
        if self.record_ttl == 0 {
            return Err(crate::Error::config("Record TTL must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            record_ttl: default_record_ttl(),
        }
    }
}

fn default_cloudflare_base_url() -> String {
    DEFAULT_CLOUDFLARE_BASE_URL.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_ip_check_services() -> Vec<String> {
    DEFAULT_IP_CHECK_SERVICES.iter().map(|s| s.to_string()).collect()
}

fn default_ip_check_timeout_secs() -> u64 {
    5
}

fn default_probe_host() -> String {
    "www.cloudflare.com".to_string()
}

fn default_probe_port() -> u16 {
    80
}

fn default_probe_timeout_secs() -> u64 {
    2
}

fn default_proxied() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    300
}

fn default_record_ttl() -> u32 {
    120
}
