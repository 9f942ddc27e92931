// # Connectivity Probe Trait
//
// A single-shot gate evaluated at the start of every cycle. When it reports
// the network unreachable, the cycle is skipped before any IP discovery or
// provider call is made.

use async_trait::async_trait;

/// Trait for outbound connectivity checks
///
/// # Rules
///
/// - Never fail: every error (resolution, timeout, refusal) is `false`
/// - No retries; the probe is re-evaluated on the next tick
/// - No side effects beyond a transient socket
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Whether outbound access to the provider currently exists
    async fn is_connected(&self) -> bool;

    /// The endpoint being probed, for log context
    fn target(&self) -> String;
}
