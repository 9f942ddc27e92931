use crate::config::{DdnsConfig, DomainTarget};
use crate::error::Result;
use crate::traits::{ConnectivityProbe, DnsProvider, IpSource, PublicIp, RecordUpdate, Reporter};

use super::{CycleEvent, CycleOutcome, DomainOutcome, DomainReport};

/// One-shot reconciliation of every configured domain
///
/// A cycle never fails as a whole: connectivity and IP discovery failures
/// skip the cycle, fetch and update failures skip only their domain. The
/// result is returned as a [`CycleOutcome`] and every step is handed to the
/// [`Reporter`].
///
/// ## Isolation
///
/// Domains are processed sequentially in configuration order. Nothing a
/// domain does (including failing) changes how the next one is handled.
///
/// ## Freshness
///
/// The public IP and every record are read anew each cycle. The reconciler
/// keeps no memory of previous cycles, so a restart changes nothing.
pub struct Reconciler {
    /// Gate for the whole cycle
    probe: Box<dyn ConnectivityProbe>,

    /// Public IP discovery
    ip_source: Box<dyn IpSource>,

    /// Record reads and writes
    provider: Box<dyn DnsProvider>,

    /// Outcome sink
    reporter: Box<dyn Reporter>,

    /// Domains to manage, in processing order
    domains: Vec<DomainTarget>,

    /// TTL written with every update
    record_ttl: u32,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration does not validate.
    pub fn new(
        probe: Box<dyn ConnectivityProbe>,
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        reporter: Box<dyn Reporter>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            probe,
            ip_source,
            provider,
            reporter,
            domains: config.domains.clone(),
            record_ttl: config.engine.record_ttl,
        })
    }

    /// Domains managed by this reconciler
    pub fn domains(&self) -> &[DomainTarget] {
        &self.domains
    }

    /// Run one full cycle across all configured domains
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.report(CycleEvent::CycleStarted {
            domains: self.domains.len(),
        });

        if !self.probe.is_connected().await {
            self.report(CycleEvent::Offline {
                target: self.probe.target(),
            });
            return CycleOutcome::Offline;
        }

        let public_ip = match self.ip_source.current().await {
            Ok(ip) => ip,
            Err(e) => {
                let reason = e.to_string();
                self.report(CycleEvent::PublicIpUnavailable {
                    source: self.ip_source.describe(),
                    reason: reason.clone(),
                });
                return CycleOutcome::NoPublicIp { reason };
            }
        };
        self.report(CycleEvent::PublicIpResolved { ip: public_ip });

        let mut reports = Vec::with_capacity(self.domains.len());
        for target in &self.domains {
            let outcome = self.reconcile_domain(target, public_ip).await;
            reports.push(DomainReport {
                domain: target.name.clone(),
                outcome,
            });
        }

        CycleOutcome::Completed {
            public_ip,
            domains: reports,
        }
    }

    /// Bring one domain's record in line with `public_ip`
    async fn reconcile_domain(&self, target: &DomainTarget, public_ip: PublicIp) -> DomainOutcome {
        let record = match self
            .provider
            .fetch_record(&target.zone_id, &target.name)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                let status = e.status();
                let error = e.to_string();
                self.report(CycleEvent::RecordUnavailable {
                    domain: target.name.clone(),
                    status,
                    error: error.clone(),
                });
                return DomainOutcome::RecordUnavailable { status, error };
            }
        };

        if public_ip.matches(&record.content) {
            self.report(CycleEvent::RecordUnchanged {
                domain: target.name.clone(),
                ip: public_ip,
            });
            return DomainOutcome::Unchanged;
        }

        let update = RecordUpdate::from_record(
            &record,
            public_ip.to_string(),
            self.record_ttl,
            target.proxied,
        );
        let dry_run = self.provider.is_dry_run();

        match self.provider.push_update(&update).await {
            Ok(()) => {
                self.report(CycleEvent::RecordUpdated {
                    domain: target.name.clone(),
                    record_type: update.record_type,
                    content: update.content,
                    previous: record.content.clone(),
                    dry_run,
                });
                DomainOutcome::Updated {
                    previous: record.content,
                    dry_run,
                }
            }
            Err(e) => {
                let status = e.status();
                let error = e.to_string();
                self.report(CycleEvent::UpdateRejected {
                    domain: target.name.clone(),
                    status,
                    error: error.clone(),
                });
                DomainOutcome::UpdateRejected { status, error }
            }
        }
    }

    pub(crate) fn report(&self, event: CycleEvent) {
        self.reporter.report(&event);
    }
}
