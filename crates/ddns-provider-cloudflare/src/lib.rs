// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider` for the
// DDNS reconciler.
//
// ## Behavior
//
// - ✅ One HTTP request per trait call (GET to read, PUT to write)
// - ✅ Raw status and payload propagated on failure (engine reports them)
// - ✅ HTTP timeout configured (10 seconds by default)
// - ✅ Dry-run mode for safe testing
// - ✅ Global API key (`X-Auth-Email` + `X-Auth-Key`) or scoped API token
// - ❌ NO retry logic (the next scheduler tick is the retry)
// - ❌ NO caching (records are read fresh every cycle)
// - ❌ NO zone discovery or record creation
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or Debug output
// - Provider construction fails fast on empty credentials
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{DnsProvider, DnsRecord, RecordUpdate};
use ddns_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "cloudflare";

/// Cloudflare API credentials
#[derive(Clone)]
pub enum Credentials {
    /// Account email + global API key
    Global {
        email: String,
        key: String,
    },
    /// Scoped API token with Zone:DNS:Edit permission
    Token(String),
}

impl Credentials {
    fn validate(&self) -> Result<()> {
        match self {
            Credentials::Global { email, key } if email.is_empty() || key.is_empty() => Err(
                Error::config("Cloudflare email and API key cannot be empty"),
            ),
            Credentials::Token(token) if token.is_empty() => {
                Err(Error::config("Cloudflare API token cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Content-Type", "application/json");
        match self {
            Credentials::Global { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
            Credentials::Token(token) => request.bearer_auth(token),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Global { .. } => f.write_str("Global(<REDACTED>)"),
            Credentials::Token(_) => f.write_str("Token(<REDACTED>)"),
        }
    }
}

/// Envelope of a list response
#[derive(Debug, Deserialize)]
struct ListResponse {
    result: Vec<CloudflareRecord>,
}

/// Envelope of a write response; only the success flag matters
#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(default = "default_success")]
    success: bool,
}

fn default_success() -> bool {
    true
}

/// DNS record as Cloudflare serializes it
#[derive(Debug, Deserialize)]
struct CloudflareRecord {
    id: String,
    #[serde(default)]
    zone_id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    #[serde(default)]
    ttl: u32,
    #[serde(default)]
    proxied: bool,
}

impl CloudflareRecord {
    fn into_record(self, requested_zone: &str) -> DnsRecord {
        DnsRecord {
            id: self.id,
            zone_id: self.zone_id.unwrap_or_else(|| requested_zone.to_string()),
            name: self.name,
            record_type: self.record_type,
            content: self.content,
            ttl: self.ttl,
            proxied: self.proxied,
        }
    }
}

/// PUT body: full replacement of the mutable fields
#[derive(Debug, Serialize)]
struct RecordBody<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// ⚠️ NEVER log this value
    credentials: Credentials,

    /// API base URL without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the credentials are empty or the HTTP
    /// client cannot be built.
    pub fn new(
        credentials: Credentials,
        base_url: impl Into<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        credentials.validate()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider from configuration
    ///
    /// The global key takes precedence when both schemes are configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                email,
                api_key,
                api_token,
                base_url,
                timeout_secs,
                dry_run,
            } => {
                let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
                let credentials = match (
                    non_empty(email),
                    non_empty(api_key),
                    non_empty(api_token),
                ) {
                    (Some(email), Some(key), _) => Credentials::Global { email, key },
                    (_, _, Some(token)) => Credentials::Token(token),
                    _ => {
                        return Err(Error::config(
                            "Cloudflare credentials missing: set email + api_key or api_token",
                        ));
                    }
                };

                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                Self::new(
                    credentials,
                    base_url.clone(),
                    Duration::from_secs(*timeout_secs),
                    *dry_run,
                )
            }
        }
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    /// Turn a non-success response into `Error::Api` carrying the raw body
    async fn status_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Error::api(PROVIDER, status, body)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Look up a record by exact name
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com
    /// ```
    async fn fetch_record(&self, zone_id: &str, name: &str) -> Result<DnsRecord> {
        tracing::debug!("Looking up DNS record {} in zone {}", name, zone_id);

        let response = self
            .credentials
            .apply(self.client.get(self.records_url(zone_id)))
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let list: ListResponse = response.json().await.map_err(|e| {
            Error::provider(PROVIDER, format!("Invalid response format: {}", e))
        })?;

        if list.result.len() > 1 {
            tracing::warn!(
                "{} DNS records match {}; using the first",
                list.result.len(),
                name
            );
        }

        list.result
            .into_iter()
            .next()
            .map(|record| record.into_record(zone_id))
            .ok_or_else(|| {
                Error::not_found(format!("no DNS record named {} in zone {}", name, zone_id))
            })
    }

    /// Replace content, TTL and proxy flag of an existing record
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "...", "content": "1.2.3.4", "ttl": 120, "proxied": true}
    /// ```
    async fn push_update(&self, update: &RecordUpdate) -> Result<()> {
        let url = format!("{}/{}", self.records_url(&update.zone_id), update.record_id);
        let body = RecordBody {
            record_type: &update.record_type,
            name: &update.name,
            content: &update.content,
            ttl: update.ttl,
            proxied: update.proxied,
        };

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&body)?
            );
            return Ok(());
        }

        let response = self
            .credentials
            .apply(self.client.put(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to read response: {}", e)))?;

        // A 2xx envelope can still report failure
        match serde_json::from_str::<WriteResponse>(&text) {
            Ok(envelope) if !envelope.success => Err(Error::api(PROVIDER, status, text)),
            _ => {
                tracing::debug!("PUT {} accepted", url);
                Ok(())
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn global() -> Credentials {
        Credentials::Global {
            email: "ops@example.com".to_string(),
            key: "secret-key-12345".to_string(),
        }
    }

    fn provider(server: &MockServer, dry_run: bool) -> CloudflareProvider {
        CloudflareProvider::new(global(), server.uri(), Duration::from_secs(2), dry_run).unwrap()
    }

    fn update() -> RecordUpdate {
        RecordUpdate {
            record_id: "rec-1".to_string(),
            zone_id: "z1".to_string(),
            name: "a.example.com".to_string(),
            record_type: "A".to_string(),
            content: "2.2.2.2".to_string(),
            ttl: 120,
            proxied: true,
        }
    }

    #[tokio::test]
    async fn fetch_sends_credentials_and_name_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .and(query_param("name", "a.example.com"))
            .and(header("X-Auth-Email", "ops@example.com"))
            .and(header("X-Auth-Key", "secret-key-12345"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": [{
                    "id": "rec-1",
                    "zone_id": "z1",
                    "type": "A",
                    "name": "a.example.com",
                    "content": "1.1.1.1",
                    "ttl": 1,
                    "proxied": true,
                    "locked": false
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = provider(&server, false)
            .fetch_record("z1", "a.example.com")
            .await
            .unwrap();

        assert_eq!(
            record,
            DnsRecord {
                id: "rec-1".to_string(),
                zone_id: "z1".to_string(),
                name: "a.example.com".to_string(),
                record_type: "A".to_string(),
                content: "1.1.1.1".to_string(),
                ttl: 1,
                proxied: true,
            }
        );
    }

    #[tokio::test]
    async fn fetch_takes_first_of_several_matches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": [
                    {"id": "first", "type": "A", "name": "a.example.com", "content": "1.1.1.1"},
                    {
                        "id": "second",
                        "type": "AAAA",
                        "name": "a.example.com",
                        "content": "2001:db8::1"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let record = provider(&server, false)
            .fetch_record("z1", "a.example.com")
            .await
            .unwrap();

        assert_eq!(record.id, "first");
        assert_eq!(record.zone_id, "z1", "missing zone_id inherits the requested zone");
    }

    #[tokio::test]
    async fn fetch_empty_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": true, "result": []})),
            )
            .mount(&server)
            .await;

        let err = provider(&server, false)
            .fetch_record("z1", "a.example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn fetch_auth_failure_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"success":false,"errors":[{"code":9103,"message":"Unknown X-Auth-Key or X-Auth-Email"}]}"#,
            ))
            .mount(&server)
            .await;

        let err = provider(&server, false)
            .fetch_record("z1", "a.example.com")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("Unknown X-Auth-Key"));
    }

    #[tokio::test]
    async fn fetch_malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "nope"})),
            )
            .mount(&server)
            .await;

        let err = provider(&server, false)
            .fetch_record("z1", "a.example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
    }

    #[tokio::test]
    async fn token_credentials_use_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Authorization", "Bearer scoped-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = CloudflareProvider::new(
            Credentials::Token("scoped-token".to_string()),
            format!("{}/", server.uri()),
            Duration::from_secs(2),
            false,
        )
        .unwrap();

        let _ = provider.fetch_record("z1", "a.example.com").await;
    }

    #[tokio::test]
    async fn push_update_sends_full_replacement() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/zones/z1/dns_records/rec-1"))
            .and(header("X-Auth-Email", "ops@example.com"))
            .and(body_json(serde_json::json!({
                "type": "A",
                "name": "a.example.com",
                "content": "2.2.2.2",
                "ttl": 120,
                "proxied": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": true, "result": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        provider(&server, false).push_update(&update()).await.unwrap();
    }

    #[tokio::test]
    async fn push_update_rejection_carries_raw_payload() {
        let server = MockServer::start().await;
        let payload = concat!(
            r#"{"success":false,"errors":"#,
            r#"[{"code":9005,"message":"Content for A record is invalid."}]}"#
        );
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_string(payload))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server, false).push_update(&update()).await.unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains(payload));
    }

    #[tokio::test]
    async fn push_update_success_false_envelope_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{"code": 1004, "message": "DNS Validation Error"}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server, false).push_update(&update()).await.unwrap_err();

        assert_eq!(err.status(), Some(200));
        assert!(err.to_string().contains("DNS Validation Error"));
    }

    #[tokio::test]
    async fn dry_run_skips_the_write() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(&server, true);
        assert!(provider.is_dry_run());
        provider.push_update(&update()).await.unwrap();
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let result = CloudflareProvider::new(
            Credentials::Token(String::new()),
            "https://api.cloudflare.com/client/v4",
            Duration::from_secs(10),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_config_prefers_global_key() {
        let config = ProviderConfig::cloudflare_global("ops@example.com", "k");
        let provider = CloudflareProvider::from_config(&config).unwrap();
        assert!(matches!(provider.credentials, Credentials::Global { .. }));
        assert_eq!(provider.base_url, "https://api.cloudflare.com/client/v4");
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn from_config_ignores_empty_global_key_when_token_is_set() {
        let config = ProviderConfig::Cloudflare {
            email: Some(String::new()),
            api_key: Some(String::new()),
            api_token: Some("scoped-token".to_string()),
            base_url: "https://api.cloudflare.com/client/v4".to_string(),
            timeout_secs: 10,
            dry_run: false,
        };
        assert!(config.validate().is_ok());

        let provider = CloudflareProvider::from_config(&config).unwrap();
        assert!(matches!(provider.credentials, Credentials::Token(ref t) if t == "scoped-token"));
    }

    #[test]
    fn from_config_rejects_config_without_usable_credentials() {
        let config = ProviderConfig::Cloudflare {
            email: Some("ops@example.com".to_string()),
            api_key: Some(String::new()),
            api_token: None,
            base_url: "https://api.cloudflare.com/client/v4".to_string(),
            timeout_secs: 10,
            dry_run: false,
        };
        assert!(config.validate().is_err());
        assert!(CloudflareProvider::from_config(&config).is_err());
    }

    #[test]
    fn credentials_not_exposed_in_debug() {
        let provider = CloudflareProvider::new(
            global(),
            "https://api.cloudflare.com/client/v4",
            Duration::from_secs(10),
            false,
        )
        .unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret-key-12345"));
        assert!(!debug_str.contains("ops@example.com"));
        assert!(debug_str.contains("CloudflareProvider"));
    }
}
