//! Linux interface detection and WiFi scanning through NetworkManager's
//! nmcli, with MAC addresses read from sysfs.

use crate::runner::{DEFAULT_TIMEOUT, run_command};
use regex::Regex;
use tracing::{debug, warn};
use wd_core::{InterfaceKind, NetworkInterface, WifiNetwork, band_for_channel};

/// One row of `nmcli -t -f DEVICE,TYPE,STATE,CONNECTION device`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRow {
    pub device: String,
    pub kind: String,
    pub state: String,
    pub connection: String,
}

pub fn parse_device_list(output: &str) -> Vec<DeviceRow> {
    let mut rows = Vec::new();
    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 4 {
            continue;
        }
        rows.push(DeviceRow {
            device: parts[0].to_string(),
            kind: parts[1].to_string(),
            state: parts[2].to_string(),
            connection: parts[3].to_string(),
        });
    }
    rows
}

/// IPv4 fields from `nmcli -t -f IP4.ADDRESS,IP4.GATEWAY,IP4.DNS device show`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ip4Details {
    pub ip_address: Option<String>,
    pub gateway: Option<String>,
    pub dns_servers: Vec<String>,
}

pub fn parse_device_show(output: &str) -> Ip4Details {
    let ip_re = Regex::new(r"(\d+\.\d+\.\d+\.\d+)").unwrap();
    let mut details = Ip4Details::default();

    for line in output.lines() {
        if line.starts_with("IP4.ADDRESS") {
            if details.ip_address.is_none() {
                details.ip_address = ip_re.captures(line).map(|cap| cap[1].to_string());
            }
        } else if line.starts_with("IP4.GATEWAY") {
            let value = line.splitn(2, ':').nth(1).unwrap_or("").trim();
            if !value.is_empty() {
                details.gateway = Some(value.to_string());
            }
        } else if line.starts_with("IP4.DNS") {
            let value = line.splitn(2, ':').nth(1).unwrap_or("").trim();
            if !value.is_empty() && !details.dns_servers.iter().any(|d| d == value) {
                details.dns_servers.push(value.to_string());
            }
        }
    }

    details
}

/// nmcli reports signal as a 0-100 percentage; invert NetworkManager's
/// dBm-to-percent mapping so the record carries a non-positive dBm value.
pub fn percent_to_dbm(percent: u32) -> i32 {
    (percent.min(100) as i32) / 2 - 100
}

/// Connected-link signal and channel from
/// `nmcli -t -f IN-USE,SIGNAL,FREQ,CHAN device wifi list ifname <dev>`:
/// the row marked `*` is the current association.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WifiLink {
    pub signal_dbm: Option<i32>,
    pub channel: Option<u32>,
}

pub fn parse_wifi_link(output: &str) -> WifiLink {
    for line in output.lines() {
        if !line.starts_with('*') {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 4 {
            continue;
        }
        return WifiLink {
            signal_dbm: parts[1].parse::<u32>().ok().map(percent_to_dbm),
            channel: parts[3].parse().ok(),
        };
    }
    WifiLink::default()
}

/// Parse the human-readable `nmcli device wifi list` table. BSSIDs are not
/// part of this format, so they stay empty and no vendor is derived.
pub fn parse_scan_table(output: &str) -> Vec<WifiNetwork> {
    let row_re =
        Regex::new(r"\s*(\*?)\s+(.+?)\s+(\w+)\s+(\d+)\s+(\d+)\s+Mbit/s\s+(\d+)\s+(.+)").unwrap();
    let mut networks = Vec::new();

    for line in output.lines().skip(1) {
        let Some(cap) = row_re.captures(line) else {
            continue;
        };

        let Ok(channel) = cap[4].parse::<u32>() else {
            continue;
        };
        let Ok(percent) = cap[6].parse::<u32>() else {
            continue;
        };

        networks.push(WifiNetwork {
            ssid: cap[2].trim().to_string(),
            bssid: String::new(),
            channel,
            frequency: band_for_channel(channel).to_string(),
            signal_dbm: percent_to_dbm(percent),
            quality: percent.min(100) as u8,
            encryption: cap[7].trim().to_string(),
            vendor: None,
        });
    }

    networks
}

async fn read_sysfs_mac(device: &str) -> String {
    match tokio::fs::read_to_string(format!("/sys/class/net/{}/address", device)).await {
        Ok(mac) => mac.trim().to_string(),
        Err(err) => {
            debug!(device, error = %err, "no sysfs MAC address");
            String::new()
        }
    }
}

/// Enumerate interfaces known to NetworkManager.
pub async fn collect_interfaces() -> Vec<NetworkInterface> {
    let listing = run_command(
        "nmcli",
        &["-t", "-f", "DEVICE,TYPE,STATE,CONNECTION", "device"],
        DEFAULT_TIMEOUT,
    )
    .await;
    if !listing.succeeded {
        warn!(error = %listing.stderr, "nmcli device listing failed");
        return Vec::new();
    }

    let mut interfaces = Vec::new();
    for row in parse_device_list(&listing.stdout) {
        let show = run_command(
            "nmcli",
            &[
                "-t",
                "-f",
                "IP4.ADDRESS,IP4.GATEWAY,IP4.DNS",
                "device",
                "show",
                &row.device,
            ],
            DEFAULT_TIMEOUT,
        )
        .await;
        let details = if show.succeeded {
            parse_device_show(&show.stdout)
        } else {
            Ip4Details::default()
        };

        let is_wifi = row.kind == "wifi";
        let link = if is_wifi {
            let link_out = run_command(
                "nmcli",
                &[
                    "-t",
                    "-f",
                    "IN-USE,SIGNAL,FREQ,CHAN",
                    "device",
                    "wifi",
                    "list",
                    "ifname",
                    &row.device,
                ],
                DEFAULT_TIMEOUT,
            )
            .await;
            if link_out.succeeded {
                parse_wifi_link(&link_out.stdout)
            } else {
                WifiLink::default()
            }
        } else {
            WifiLink::default()
        };

        interfaces.push(NetworkInterface {
            name: row.device.clone(),
            kind: if is_wifi {
                InterfaceKind::WiFi
            } else {
                InterfaceKind::Ethernet
            },
            status: row.state,
            mac_address: read_sysfs_mac(&row.device).await,
            ip_address: details.ip_address,
            gateway: details.gateway,
            dns_servers: details.dns_servers,
            signal_dbm: link.signal_dbm,
            frequency: link.channel.map(|c| band_for_channel(c).to_string()),
            channel: link.channel,
        });
    }

    interfaces
}

/// Scan for WiFi networks with `nmcli device wifi list`.
pub async fn scan_networks() -> Vec<WifiNetwork> {
    let scan = run_command("nmcli", &["device", "wifi", "list"], DEFAULT_TIMEOUT).await;
    if !scan.succeeded {
        warn!(error = %scan.stderr, "nmcli wifi scan failed");
        return Vec::new();
    }
    parse_scan_table(&scan.stdout)
}
