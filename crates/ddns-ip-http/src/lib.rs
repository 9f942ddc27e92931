// # HTTP IP Source
//
// This crate discovers the host's public IP by asking IP-check services
// ("what is my IP" echo endpoints) over HTTP.
//
// ## Fallback Order
//
// Services are queried strictly in list order, one at a time. The first
// usable answer wins and no later service is contacted. Racing them would
// put load on every service on every cycle and make the answer depend on
// network timing.
//
// ## Usable Answer
//
// - 2xx status
// - Body that, trimmed, parses as an IP address
// - Address in the configured family (any, v4, v6)
//
// Anything else (timeout, refusal, error status, HTML error page) moves on
// to the next service.

use async_trait::async_trait;
use ddns_core::config::IpCheckConfig;
use ddns_core::traits::{IpFamily, IpSource, PublicIp};
use ddns_core::{Error, Result};
use std::time::Duration;

/// HTTP IP source with ordered fallback across services
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// Service URLs in priority order
    services: Vec<String>,

    /// Address family to accept
    family: IpFamily,

    /// HTTP client (carries the per-attempt timeout)
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `services`: Service URLs, queried in this order
    /// - `timeout`: Bound on each individual attempt
    pub fn new(services: Vec<String>, timeout: Duration) -> Result<Self> {
        if services.is_empty() {
            return Err(Error::config("At least one IP check service is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            services,
            family: IpFamily::Any,
            client,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &IpCheckConfig) -> Result<Self> {
        Ok(Self::new(config.services.clone(), config.timeout())?.with_family(config.family))
    }

    /// Only accept addresses of `family`
    pub fn with_family(mut self, family: IpFamily) -> Self {
        self.family = family;
        self
    }

    /// Services in query order
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Ask a single service
    async fn query(&self, url: &str) -> Result<PublicIp> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::provider("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::api("http", response.status().as_u16(), ""));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::provider("http", format!("Failed to read response: {}", e)))?;

        let ip: PublicIp = body.trim().parse()?;

        if !self.family.accepts(&ip) {
            return Err(Error::invalid_input(format!(
                "Expected {:?} address, got: {}",
                self.family, ip
            )));
        }

        Ok(ip)
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<PublicIp> {
        for url in &self.services {
            match self.query(url).await {
                Ok(ip) => {
                    tracing::debug!("Public IP {} from {}", ip, url);
                    return Ok(ip);
                }
                Err(e) => {
                    tracing::warn!("IP check service {} unusable: {}", url, e);
                }
            }
        }

        Err(Error::ip_source(format!(
            "all {} IP check services failed",
            self.services.len()
        )))
    }

    fn describe(&self) -> String {
        format!("http ({} services)", self.services.len())
    }
}
