//! Reporter implementations
//!
//! - [`TracingReporter`]: writes every event to `tracing` at the event's level
//! - [`ChannelReporter`]: forwards events to a bounded channel for external
//!   monitoring or test capture

use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, trace, warn};

use crate::engine::CycleEvent;
use crate::traits::Reporter;

/// Reporter that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a new tracing reporter
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&self, event: &CycleEvent) {
        let level = event.level();
        if level == Level::ERROR {
            error!("{}", event);
        } else if level == Level::WARN {
            warn!("{}", event);
        } else if level == Level::INFO {
            info!("{}", event);
        } else if level == Level::DEBUG {
            debug!("{}", event);
        } else {
            trace!("{}", event);
        }
    }
}

/// Reporter that forwards events to a bounded channel
///
/// When the channel is full the event is dropped with a warning; reporting
/// never blocks a cycle.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    event_tx: mpsc::Sender<CycleEvent>,
}

impl ChannelReporter {
    /// Create a reporter and the receiver that yields its events
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<CycleEvent>) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        (Self { event_tx }, event_rx)
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, event: &CycleEvent) {
        if self.event_tx.try_send(event.clone()).is_err() {
            warn!("Event channel full or closed, dropping event: {}", event);
        }
    }
}
