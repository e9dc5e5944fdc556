//! macOS interface detection and WiFi scanning via networksetup, ifconfig,
//! scutil and the airport utility.

use crate::runner::{DEFAULT_TIMEOUT, run_command};
use regex::Regex;
use tracing::{debug, warn};
use wd_core::{
    InterfaceKind, NetworkInterface, WifiNetwork, band_for_channel, quality_percent,
    vendor_for_mac,
};

const AIRPORT_BIN: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

/// One block from `networksetup -listallhardwareports`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwarePort {
    pub name: String,
    pub device: String,
    pub mac: String,
}

impl HardwarePort {
    pub fn is_wifi(&self) -> bool {
        self.name.to_lowercase().contains("wi-fi") || self.device.to_lowercase().contains("wifi")
    }
}

/// Parse the block format of `networksetup -listallhardwareports`: repeating
/// "Hardware Port:" / "Device:" / "Ethernet Address:" stanzas.
pub fn parse_hardware_ports(output: &str) -> Vec<HardwarePort> {
    let mut ports = Vec::new();
    let mut current: Option<HardwarePort> = None;

    for line in output.lines() {
        let line = line.trim();
        if let Some(name) = line.strip_prefix("Hardware Port:") {
            if let Some(port) = current.take() {
                ports.push(port);
            }
            current = Some(HardwarePort {
                name: name.trim().to_string(),
                ..Default::default()
            });
        } else if let Some(device) = line.strip_prefix("Device:") {
            if let Some(port) = current.as_mut() {
                port.device = device.trim().to_string();
            }
        } else if let Some(mac) = line.strip_prefix("Ethernet Address:") {
            if let Some(port) = current.as_mut() {
                port.mac = mac.trim().to_string();
            }
        }
    }
    if let Some(port) = current {
        ports.push(port);
    }

    ports
}

/// First IPv4 address in `ifconfig <dev>` output.
pub fn parse_inet_address(output: &str) -> Option<String> {
    let re = Regex::new(r"inet (\d+\.\d+\.\d+\.\d+)").unwrap();
    re.captures(output).map(|cap| cap[1].to_string())
}

/// Nameservers from `scutil --dns`, deduplicated, first-seen order.
pub fn parse_dns_servers(output: &str) -> Vec<String> {
    let re = Regex::new(r"nameserver\[\d+\] : (\d+\.\d+\.\d+\.\d+)").unwrap();
    let mut servers = Vec::new();
    for cap in re.captures_iter(output) {
        let server = cap[1].to_string();
        if !servers.contains(&server) {
            servers.push(server);
        }
    }
    servers
}

/// Current-link fields from `airport -I`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirportLink {
    pub signal_dbm: Option<i32>,
    pub channel: Option<u32>,
}

pub fn parse_airport_link(output: &str) -> AirportLink {
    let signal_re = Regex::new(r"agrCtlRSSI: (-?\d+)").unwrap();
    let channel_re = Regex::new(r"channel: (\d+)").unwrap();

    AirportLink {
        signal_dbm: signal_re
            .captures(output)
            .and_then(|cap| cap[1].parse().ok()),
        channel: channel_re
            .captures(output)
            .and_then(|cap| cap[1].parse().ok()),
    }
}

/// Parse the `airport -s` scan table. Column layout: SSID BSSID RSSI CHANNEL
/// HT CC SECURITY...; the header row is skipped and malformed rows dropped.
pub fn parse_airport_scan(output: &str) -> Vec<WifiNetwork> {
    let mut networks = Vec::new();

    for line in output.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            continue;
        }

        let Ok(signal) = parts[2].parse::<i32>() else {
            continue;
        };
        // Wide channels print as "36,+1"; keep the primary channel.
        let Some(Ok(channel)) = parts[3]
            .split(',')
            .next()
            .map(|c| c.parse::<u32>())
        else {
            continue;
        };

        let bssid = parts[1].to_string();
        let encryption = if parts.len() > 6 {
            parts[6..].join(" ")
        } else {
            "Open".to_string()
        };

        networks.push(WifiNetwork {
            ssid: parts[0].to_string(),
            vendor: vendor_for_mac(&bssid).map(str::to_string),
            bssid,
            channel,
            frequency: band_for_channel(channel).to_string(),
            signal_dbm: signal,
            quality: quality_percent(signal),
            encryption,
        });
    }

    networks
}

/// Enumerate macOS interfaces and enrich WiFi ports with link info.
pub async fn collect_interfaces() -> Vec<NetworkInterface> {
    let listing = run_command("networksetup", &["-listallhardwareports"], DEFAULT_TIMEOUT).await;
    if !listing.succeeded {
        warn!(error = %listing.stderr, "failed to list hardware ports");
        return Vec::new();
    }

    // One scutil pass covers every interface.
    let scutil = run_command("scutil", &["--dns"], DEFAULT_TIMEOUT).await;
    let dns_servers = if scutil.succeeded {
        parse_dns_servers(&scutil.stdout)
    } else {
        Vec::new()
    };

    let mut interfaces = Vec::new();
    for port in parse_hardware_ports(&listing.stdout) {
        let ifconfig = run_command("ifconfig", &[&port.device], DEFAULT_TIMEOUT).await;
        let ip_address = if ifconfig.succeeded {
            parse_inet_address(&ifconfig.stdout)
        } else {
            None
        };

        let link = if port.is_wifi() {
            let airport = run_command(AIRPORT_BIN, &["-I"], DEFAULT_TIMEOUT).await;
            if airport.succeeded {
                parse_airport_link(&airport.stdout)
            } else {
                debug!(device = %port.device, "airport -I unavailable");
                AirportLink::default()
            }
        } else {
            AirportLink::default()
        };

        interfaces.push(NetworkInterface {
            name: port.name.clone(),
            kind: if port.is_wifi() {
                InterfaceKind::WiFi
            } else {
                InterfaceKind::Ethernet
            },
            status: if ip_address.is_some() { "active" } else { "inactive" }.to_string(),
            mac_address: port.mac,
            ip_address,
            gateway: None,
            dns_servers: dns_servers.clone(),
            signal_dbm: link.signal_dbm,
            frequency: link.channel.map(|c| band_for_channel(c).to_string()),
            channel: link.channel,
        });
    }

    interfaces
}

/// Scan for WiFi networks with `airport -s`.
pub async fn scan_networks() -> Vec<WifiNetwork> {
    let scan = run_command(AIRPORT_BIN, &["-s"], DEFAULT_TIMEOUT).await;
    if !scan.succeeded {
        warn!(error = %scan.stderr, "airport scan failed");
        return Vec::new();
    }
    parse_airport_scan(&scan.stdout)
}
