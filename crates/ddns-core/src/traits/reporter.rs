// # Reporter Trait
//
// The reconciler never logs cycle outcomes directly. It hands every outcome
// to an injected `Reporter` as a `CycleEvent`, so tests can capture exactly
// what was reported instead of parsing log output.

use crate::engine::CycleEvent;

/// Sink for reconciliation events
///
/// Implementations must not block: `report` is called inline from the cycle.
pub trait Reporter: Send + Sync {
    /// Record one event
    fn report(&self, event: &CycleEvent);
}
