//! Test doubles and common utilities for reconciliation contract tests
//!
//! Every double is `Clone` and shares its state between clones, so a test
//! can hand one clone to the reconciler and keep another for assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use ddns_core::config::{DdnsConfig, DomainTarget, ProviderConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    ConnectivityProbe, DnsProvider, DnsRecord, IpSource, PublicIp, RecordUpdate,
};
use ddns_core::{ChannelReporter, CycleEvent, Reconciler};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// A probe with a fixed answer
#[derive(Clone)]
pub struct StaticProbe {
    connected: bool,
    calls: Arc<AtomicUsize>,
}

impl StaticProbe {
    pub fn online() -> Self {
        Self {
            connected: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn offline() -> Self {
        Self {
            connected: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times is_connected() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for StaticProbe {
    async fn is_connected(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.connected
    }

    fn target(&self) -> String {
        "probe.test:80".to_string()
    }
}

/// An IP source with a fixed answer and optional latency
#[derive(Clone)]
pub struct StaticIpSource {
    answer: Option<PublicIp>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn resolving(ip: &str) -> Self {
        Self {
            answer: Some(ip.parse().expect("valid test IP")),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            ..Self::resolving("0.0.0.0")
        }
    }

    /// Make every resolution take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of times current() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent current() calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<PublicIp> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.answer
            .ok_or_else(|| Error::ip_source("all 3 IP check services failed"))
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// How the mock provider answers a fetch for one name
#[derive(Clone)]
enum FetchBehavior {
    Found(DnsRecord),
    Status(u16),
}

/// An in-memory provider that records every call
///
/// Accepted updates are applied to the stored record, so later cycles see
/// the new content just as they would against the real provider.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    records: Arc<Mutex<HashMap<String, FetchBehavior>>>,
    rejected: Arc<Mutex<HashSet<String>>>,
    fetches: Arc<Mutex<Vec<String>>>,
    updates: Arc<Mutex<Vec<RecordUpdate>>>,
    dry_run: bool,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an A record for `name` in `zone_id`
    pub fn with_record(self, zone_id: &str, name: &str, content: &str) -> Self {
        let record = DnsRecord {
            id: format!("rec-{}", name),
            zone_id: zone_id.to_string(),
            name: name.to_string(),
            record_type: "A".to_string(),
            content: content.to_string(),
            ttl: 1,
            proxied: false,
        };
        self.records
            .lock()
            .unwrap()
            .insert(name.to_string(), FetchBehavior::Found(record));
        self
    }

    /// Answer fetches for `name` with an HTTP error status
    pub fn with_fetch_status(self, name: &str, status: u16) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(name.to_string(), FetchBehavior::Status(status));
        self
    }

    /// Reject every update for `name`
    pub fn rejecting_updates_for(self, name: &str) -> Self {
        self.rejected.lock().unwrap().insert(name.to_string());
        self
    }

    /// Accept updates without applying them
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Change a stored record's content behind the reconciler's back
    pub fn set_content(&self, name: &str, content: &str) {
        if let Some(FetchBehavior::Found(record)) = self.records.lock().unwrap().get_mut(name) {
            record.content = content.to_string();
        }
    }

    /// Names passed to fetch_record(), in call order
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    /// Updates passed to push_update(), in call order
    pub fn updates(&self) -> Vec<RecordUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Total number of provider calls
    pub fn call_count(&self) -> usize {
        self.fetches.lock().unwrap().len() + self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn fetch_record(&self, _zone_id: &str, name: &str) -> Result<DnsRecord> {
        self.fetches.lock().unwrap().push(name.to_string());

        match self.records.lock().unwrap().get(name) {
            Some(FetchBehavior::Found(record)) => Ok(record.clone()),
            Some(FetchBehavior::Status(status)) => Err(Error::api(
                "mock",
                *status,
                r#"{"success":false,"errors":[{"code":10000,"message":"Authentication error"}]}"#,
            )),
            None => Err(Error::not_found(format!("no DNS record named {}", name))),
        }
    }

    async fn push_update(&self, update: &RecordUpdate) -> Result<()> {
        self.updates.lock().unwrap().push(update.clone());

        if self.rejected.lock().unwrap().contains(&update.name) {
            return Err(Error::api(
                "mock",
                400,
                r#"{"success":false,"errors":[{"code":9005,"message":"Content for A record is invalid."}]}"#,
            ));
        }

        if !self.dry_run {
            self.set_content(&update.name, &update.content);
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn config_for(domains: &[DomainTarget]) -> DdnsConfig {
    let mut config =
        DdnsConfig::new(ProviderConfig::cloudflare_global("ops@example.com", "test-key"));
    config.domains = domains.to_vec();
    config
}

/// Build a reconciler over the given doubles, reporting into a channel
pub fn reconciler(
    probe: &StaticProbe,
    ip_source: &StaticIpSource,
    provider: &MockDnsProvider,
    domains: &[DomainTarget],
) -> (Reconciler, mpsc::Receiver<CycleEvent>) {
    let (reporter, events) = ChannelReporter::new(1024);
    let reconciler = Reconciler::new(
        Box::new(probe.clone()),
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        Box::new(reporter),
        &config_for(domains),
    )
    .expect("reconciler construction succeeds");
    (reconciler, events)
}

/// Collect every event reported so far
pub fn drain(events: &mut mpsc::Receiver<CycleEvent>) -> Vec<CycleEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}
