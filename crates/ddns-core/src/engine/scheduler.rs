use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Error, Result};

use super::{CycleEvent, Reconciler};

/// Runs the reconciler once at startup and then on a fixed interval
///
/// ## Lifecycle
///
/// 1. Create with [`Scheduler::new()`]
/// 2. Start with [`Scheduler::run()`] (OS signals) or
///    [`Scheduler::run_until()`] (caller-supplied shutdown)
/// 3. Returns after shutdown with the number of completed cycles
///
/// ## Timing
///
/// - The first cycle runs immediately
/// - Cycles never overlap; a slow cycle delays the next tick instead of
///   queueing extra ones
/// - Ticks missed while the process was stopped are not caught up
/// - Shutdown is observed between cycles; a running cycle completes first
pub struct Scheduler {
    reconciler: Reconciler,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler running `reconciler` every `interval`
    pub fn new(reconciler: Reconciler, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
        }
    }

    /// Create a scheduler using the configured interval
    pub fn from_config(reconciler: Reconciler, config: &EngineConfig) -> Self {
        Self::new(reconciler, config.interval())
    }

    /// Run until SIGINT or SIGTERM
    ///
    /// # Returns
    ///
    /// - `Ok(cycles)`: Clean shutdown after `cycles` completed cycles
    /// - `Err(Error)`: Signal handlers could not be installed
    pub async fn run(&self) -> Result<usize> {
        let signal = shutdown_signal()?;
        Ok(self.run_until(signal).await)
    }

    /// Run until `shutdown` completes
    ///
    /// Returns the number of completed cycles.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = &'static str>,
    {
        self.reconciler.report(CycleEvent::SchedulerStarted {
            domains: self.reconciler.domains().len(),
            interval: self.interval,
        });

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        let mut cycles = 0;

        let reason = loop {
            tokio::select! {
                biased;

                reason = &mut shutdown => break reason,

                _ = ticker.tick() => {
                    let outcome = self.reconciler.run_cycle().await;
                    cycles += 1;
                    debug!(
                        "Cycle {} finished: {} updated, {} failed",
                        cycles,
                        outcome.updated_count(),
                        outcome.failed_count()
                    );
                }
            }
        };

        self.reconciler.report(CycleEvent::SchedulerStopped {
            reason: reason.to_string(),
            cycles,
        });

        cycles
    }
}

/// Future resolving with the name of the first shutdown signal received
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| Error::Other(format!("Failed to setup SIGTERM handler: {}", e)))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| Error::Other(format!("Failed to setup SIGINT handler: {}", e)))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "CTRL-C",
            Err(_) => "CTRL-C handler failed",
        }
    })
}
