// # ddns-core
//
// Core library for keeping DNS address records pointed at the host's
// current public IP.
//
// ## Architecture Overview
//
// - **ConnectivityProbe**: Trait gating each cycle on outbound network access
// - **IpSource**: Trait for discovering the public IP
// - **DnsProvider**: Trait for reading and writing records via provider APIs
// - **Reporter**: Trait receiving every cycle outcome as an event
// - **Reconciler**: One cycle of probe → resolve → fetch → compare → update
// - **Scheduler**: Runs the reconciler on a fixed interval until shutdown
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Provider Truth**: Every cycle compares against the provider's record,
//    never against a locally remembered IP, so restarts are harmless
// 3. **Isolation**: A failing domain never affects another domain
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Injected Configuration**: No ambient globals; components receive
//    their configuration explicitly

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod probe;
pub mod report;

// Re-export core types for convenience
pub use traits::{ConnectivityProbe, IpSource, DnsProvider, Reporter};
pub use engine::{CycleEvent, CycleOutcome, DomainOutcome, Reconciler, Scheduler};
pub use config::{DdnsConfig, DomainTarget, IpCheckConfig, ProbeConfig, ProviderConfig};
pub use error::{Error, Result};
pub use probe::TcpProbe;
pub use report::{ChannelReporter, TracingReporter};
