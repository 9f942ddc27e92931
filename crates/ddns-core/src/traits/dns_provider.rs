// # DNS Provider Trait
//
// Defines the interface for reading and writing address records via a
// provider's API, scoped to one (zone, record name) pair at a time.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
// use ddns_core::traits::RecordUpdate;
//
// #[tokio::main]
// async fn main() -> ddns_core::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let record = provider.fetch_record("zone-id", "home.example.com").await?;
//     let update = RecordUpdate::from_record(&record, "203.0.113.7", 120, true);
//     provider.push_update(&update).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A DNS record as the provider currently stores it
///
/// Provider-side truth. Fetched fresh every cycle and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// The record ID (provider-specific)
    pub id: String,
    /// Zone the record lives in
    pub zone_id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record type ("A" or "AAAA")
    pub record_type: String,
    /// Record content (an IP address for address records)
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Whether traffic is routed through the provider's edge
    pub proxied: bool,
}

/// A full replacement of an existing record's content, TTL and proxy flag
///
/// Name and type are carried over from the existing record unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// ID of the record being replaced
    pub record_id: String,
    /// Zone of the record being replaced
    pub zone_id: String,
    /// Record name (preserved)
    pub name: String,
    /// Record type (preserved)
    pub record_type: String,
    /// New content
    pub content: String,
    /// New TTL in seconds
    pub ttl: u32,
    /// New proxy flag
    pub proxied: bool,
}

impl RecordUpdate {
    /// Build an update for `record` that points it at `content`
    pub fn from_record(
        record: &DnsRecord,
        content: impl Into<String>,
        ttl: u32,
        proxied: bool,
    ) -> Self {
        Self {
            record_id: record.id.clone(),
            zone_id: record.zone_id.clone(),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            content: content.into(),
            ttl,
            proxied,
        }
    }
}

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure with the raw provider status/payload
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads
/// - ❌ Retry or back off (the next scheduler tick is the retry)
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
/// - ❌ Cache records between calls
/// - ❌ Create records or discover zones
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the record named `name` in zone `zone_id`
    ///
    /// The lookup is filtered by exact name. When the provider lists several
    /// matches, the first one is returned.
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The first matching record
    /// - `Err(Error::NotFound)`: The provider listed no matching record
    /// - `Err(Error::Api)`: Non-success status (the status is kept, so an
    ///   authentication failure can be told apart from an absent record)
    /// - `Err(Error::Provider)`: Transport failure or malformed response
    async fn fetch_record(&self, zone_id: &str, name: &str) -> Result<DnsRecord, crate::Error>;

    /// Replace an existing record's content, TTL and proxy flag
    ///
    /// Single attempt, no retry.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the update
    /// - `Err(Error::Api)`: Rejected; `body` holds the raw provider payload
    /// - `Err(Error::Provider)`: Transport failure
    async fn push_update(&self, update: &RecordUpdate) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Whether `push_update` only logs and never writes
    fn is_dry_run(&self) -> bool {
        false
    }
}
