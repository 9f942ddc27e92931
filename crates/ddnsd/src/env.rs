//! Environment-variable configuration
//!
//! Every setting comes from a `DDNS_*` variable. Parsing goes through a
//! lookup function so it can be exercised without touching the process
//! environment.

use anyhow::{Context, Result};
use ddns_core::config::{
    DEFAULT_CLOUDFLARE_BASE_URL, DdnsConfig, DomainTarget, EngineConfig, IpCheckConfig,
    ProbeConfig, ProviderConfig,
};
use ddns_core::traits::IpFamily;
use std::str::FromStr;
use tracing::Level;

/// Daemon configuration: the engine config plus logging
#[derive(Debug)]
pub struct Config {
    pub ddns: DdnsConfig,
    pub log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let dry_run = match var("DDNS_MODE").as_deref() {
            None | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        let provider = ProviderConfig::Cloudflare {
            email: var("DDNS_CF_EMAIL"),
            api_key: var("DDNS_CF_API_KEY"),
            api_token: var("DDNS_CF_API_TOKEN"),
            base_url: var("DDNS_CF_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CLOUDFLARE_BASE_URL.to_string()),
            timeout_secs: 10,
            dry_run,
        };

        let domains = match var("DDNS_DOMAINS") {
            Some(raw) => parse_domains(&raw)?,
            None => anyhow::bail!(
                "DDNS_DOMAINS is required. \
                Set it via: export DDNS_DOMAINS=zone_id:home.example.com"
            ),
        };

        let mut ip_check = IpCheckConfig::default();
        if let Some(raw) = var("DDNS_IP_CHECK_SERVICES") {
            ip_check.services = split_list(&raw);
        }
        if let Some(raw) = var("DDNS_IP_FAMILY") {
            ip_check.family = IpFamily::from_str(&raw)?;
        }

        let mut probe = ProbeConfig::default();
        if let Some(host) = var("DDNS_PROBE_HOST") {
            probe.host = host;
        }
        if let Some(port) = var("DDNS_PROBE_PORT") {
            probe.port = parse_number("DDNS_PROBE_PORT", &port)?;
        }

        let mut engine = EngineConfig::default();
        if let Some(secs) = var("DDNS_INTERVAL_SECS") {
            engine.interval_secs = parse_number("DDNS_INTERVAL_SECS", &secs)?;
        }
        if let Some(ttl) = var("DDNS_RECORD_TTL") {
            engine.record_ttl = parse_number("DDNS_RECORD_TTL", &ttl)?;
        }

        let log_level = parse_log_level(var("DDNS_LOG_LEVEL").as_deref().unwrap_or("info"))?;

        let ddns = DdnsConfig {
            provider,
            ip_check,
            probe,
            domains,
            engine,
        };
        ddns.validate()?;

        Ok(Self { ddns, log_level })
    }
}

/// Parse `zone_id:domain[:proxied]` entries separated by commas
fn parse_domains(raw: &str) -> Result<Vec<DomainTarget>> {
    let mut domains = Vec::new();

    for entry in split_list(raw) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let (zone_id, name, proxied) = match parts.as_slice() {
            [zone_id, name] => (*zone_id, *name, true),
            [zone_id, name, proxied] => {
                let proxied = parse_bool(proxied).with_context(|| {
                    format!("Invalid proxied flag in DDNS_DOMAINS entry '{}'", entry)
                })?;
                (*zone_id, *name, proxied)
            }
            _ => anyhow::bail!(
                "DDNS_DOMAINS entry '{}' must look like zone_id:domain[:proxied]",
                entry
            ),
        };

        validate_domain_name(name)?;
        domains.push(DomainTarget::new(zone_id, name, proxied));
    }

    if domains.is_empty() {
        anyhow::bail!("DDNS_DOMAINS must contain at least one domain");
    }

    Ok(domains)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => anyhow::bail!("expected true or false, got '{}'", other),
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| anyhow::anyhow!("{} must be a number. Got: {}", key, raw))
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks; catches typos, not every invalid name.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    // RFC 1035: 253 chars max
    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        // Wildcard labels are allowed only on their own
        if label == "*" {
            continue;
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric, hyphen and underscore only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}
