//! Core reconciliation engine
//!
//! The engine is responsible for:
//! - Gating each cycle on outbound connectivity
//! - Resolving the public IP afresh every cycle
//! - Comparing it against each domain's provider-side record
//! - Pushing an update only when the two differ
//! - Repeating on a fixed interval until shutdown
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   tick   ┌──────────────┐
//! │  Scheduler  │────────▶│  Reconciler  │
//! └─────────────┘          └──────────────┘
//!                                  │
//!     ┌──────────────────┬─────────┴────────┬──────────────────┐
//!     ▼                  ▼                  ▼                  ▼
//! ┌──────────────┐ ┌────────────┐   ┌──────────────┐   ┌────────────┐
//! │ Connectivity │ │  IpSource  │   │ DnsProvider  │   │  Reporter  │
//! │ Probe (gate) │ │ (resolve)  │   │ (fetch/push) │   │  (events)  │
//! └──────────────┘ └────────────┘   └──────────────┘   └────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Probe connectivity; abort the cycle if offline
//! 2. Resolve the public IP; abort the cycle if no service answers
//! 3. For each domain, in configuration order:
//!    fetch record → compare → update on mismatch
//! 4. Report every outcome; no failure leaves its domain

mod reconciler;
mod scheduler;

pub use reconciler::Reconciler;
pub use scheduler::Scheduler;

use std::fmt;
use std::time::Duration;

use tracing::Level;

use crate::traits::PublicIp;

/// Events reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// Scheduler started
    SchedulerStarted {
        domains: usize,
        interval: Duration,
    },

    /// Scheduler stopped
    SchedulerStopped {
        reason: String,
        cycles: usize,
    },

    /// A cycle began
    CycleStarted {
        domains: usize,
    },

    /// Connectivity probe failed; cycle skipped
    Offline {
        target: String,
    },

    /// No IP-check service gave a usable answer; cycle skipped
    PublicIpUnavailable {
        source: String,
        reason: String,
    },

    /// Public IP resolved for this cycle
    PublicIpResolved {
        ip: PublicIp,
    },

    /// Record already points at the public IP
    RecordUnchanged {
        domain: String,
        ip: PublicIp,
    },

    /// Record updated to the public IP
    ///
    /// With `dry_run` set the provider accepted the update without writing it.
    RecordUpdated {
        domain: String,
        record_type: String,
        content: String,
        previous: String,
        dry_run: bool,
    },

    /// Record could not be fetched; domain skipped
    RecordUnavailable {
        domain: String,
        status: Option<u16>,
        error: String,
    },

    /// Provider rejected the update; domain skipped
    UpdateRejected {
        domain: String,
        status: Option<u16>,
        error: String,
    },
}

impl CycleEvent {
    /// Log level this event is reported at
    pub fn level(&self) -> Level {
        match self {
            CycleEvent::Offline { .. }
            | CycleEvent::PublicIpUnavailable { .. }
            | CycleEvent::RecordUnavailable { .. }
            | CycleEvent::UpdateRejected { .. } => Level::ERROR,
            CycleEvent::CycleStarted { .. } | CycleEvent::PublicIpResolved { .. } => Level::DEBUG,
            CycleEvent::SchedulerStarted { .. }
            | CycleEvent::SchedulerStopped { .. }
            | CycleEvent::RecordUnchanged { .. }
            | CycleEvent::RecordUpdated { .. } => Level::INFO,
        }
    }

    /// Domain this event concerns, if any
    pub fn domain(&self) -> Option<&str> {
        match self {
            CycleEvent::RecordUnchanged { domain, .. }
            | CycleEvent::RecordUpdated { domain, .. }
            | CycleEvent::RecordUnavailable { domain, .. }
            | CycleEvent::UpdateRejected { domain, .. } => Some(domain),
            _ => None,
        }
    }
}

impl fmt::Display for CycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleEvent::SchedulerStarted { domains, interval } => write!(
                f,
                "Scheduler started: {} domain(s), checking every {}s",
                domains,
                interval.as_secs()
            ),
            CycleEvent::SchedulerStopped { reason, cycles } => {
                write!(f, "Scheduler stopped after {} cycle(s): {}", cycles, reason)
            }
            CycleEvent::CycleStarted { domains } => {
                write!(f, "Starting check for {} domain(s)", domains)
            }
            CycleEvent::Offline { target } => write!(
                f,
                "No internet connection ({} unreachable). Skipping check and update.",
                target
            ),
            CycleEvent::PublicIpUnavailable { source, reason } => write!(
                f,
                "Failed to retrieve public IP from {}: {}. Skipping check and update.",
                source, reason
            ),
            CycleEvent::PublicIpResolved { ip } => write!(f, "Public IP is {}", ip),
            CycleEvent::RecordUnchanged { domain, .. } => write!(
                f,
                "IP addresses are the same for {}. No update needed.",
                domain
            ),
            CycleEvent::RecordUpdated {
                domain,
                record_type,
                content,
                previous,
                dry_run: false,
            } => write!(
                f,
                "DNS record updated successfully: {} ({}) -> {} (was {})",
                domain, record_type, content, previous
            ),
            CycleEvent::RecordUpdated {
                domain,
                record_type,
                content,
                previous,
                dry_run: true,
            } => write!(
                f,
                "[DRY-RUN] DNS record not written: {} ({}) would be {} (is {})",
                domain, record_type, content, previous
            ),
            CycleEvent::RecordUnavailable {
                domain,
                status,
                error,
            } => match status {
                Some(401 | 403) => write!(
                    f,
                    "DNS record for {} not readable: provider rejected the credentials ({})",
                    domain, error
                ),
                Some(status) => write!(
                    f,
                    "DNS record for {} not found (status {}): {}",
                    domain, status, error
                ),
                None => write!(f, "DNS record for {} not found: {}", domain, error),
            },
            CycleEvent::UpdateRejected { domain, error, .. } => {
                write!(f, "Failed to update DNS record for {}: {}", domain, error)
            }
        }
    }
}

/// What happened to one domain in one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Record content already equals the public IP
    Unchanged,
    /// Record was updated; `previous` is the content it replaced.
    /// `dry_run` means the provider skipped the write.
    Updated { previous: String, dry_run: bool },
    /// Record could not be fetched
    RecordUnavailable { status: Option<u16>, error: String },
    /// Provider rejected the update
    UpdateRejected { status: Option<u16>, error: String },
}

/// Per-domain result within a completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReport {
    pub domain: String,
    pub outcome: DomainOutcome,
}

/// Result of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Connectivity probe failed; no domain was touched
    Offline,
    /// Public IP could not be resolved; no domain was touched
    NoPublicIp { reason: String },
    /// Every configured domain was processed
    Completed {
        public_ip: PublicIp,
        domains: Vec<DomainReport>,
    },
}

impl CycleOutcome {
    /// Number of domains updated this cycle
    pub fn updated_count(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Updated { .. }))
    }

    /// Number of domains that failed (fetch or update) this cycle
    pub fn failed_count(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                DomainOutcome::RecordUnavailable { .. } | DomainOutcome::UpdateRejected { .. }
            )
        })
    }

    fn count(&self, pred: impl Fn(&DomainOutcome) -> bool) -> usize {
        match self {
            CycleOutcome::Completed { domains, .. } => {
                domains.iter().filter(|d| pred(&d.outcome)).count()
            }
            _ => 0,
        }
    }
}
