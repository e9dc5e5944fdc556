pub mod legacy;
pub mod macos;
pub mod nmcli;
pub mod perf;
pub mod runner;
pub mod strategy;

pub use runner::{CommandOutput, run_command, run_shell};
pub use strategy::{DnsProbeTool, InterfaceSource, Platform, ProbeStrategy, ScanSource};

use wd_core::{NetworkInterface, WifiNetwork};

/// Enumerate network interfaces through the strategy chosen at startup.
pub async fn collect_interfaces(strategy: &ProbeStrategy) -> Vec<NetworkInterface> {
    match strategy.interface_source {
        InterfaceSource::MacOs => macos::collect_interfaces().await,
        InterfaceSource::NetworkManager => nmcli::collect_interfaces().await,
        InterfaceSource::Legacy => legacy::collect_interfaces().await,
    }
}

/// Scan for nearby WiFi networks through the strategy chosen at startup.
pub async fn scan_networks(
    strategy: &ProbeStrategy,
    interfaces: &[NetworkInterface],
) -> Vec<WifiNetwork> {
    match strategy.scan_source {
        ScanSource::Airport => macos::scan_networks().await,
        ScanSource::NetworkManager => nmcli::scan_networks().await,
        ScanSource::Iwlist => legacy::scan_networks(interfaces).await,
    }
}
