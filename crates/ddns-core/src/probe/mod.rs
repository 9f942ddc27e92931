// # Connectivity Probe Implementations
//
// This module provides implementations of the ConnectivityProbe trait.

pub mod tcp;

pub use tcp::TcpProbe;
