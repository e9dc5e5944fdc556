//! Legacy Linux interface detection and WiFi scanning for hosts without
//! NetworkManager: /sys/class/net enumeration plus ip, iwconfig and iwlist.

use crate::runner::{DEFAULT_TIMEOUT, SCAN_TIMEOUT, run_command};
use regex::Regex;
use tracing::{debug, warn};
use wd_core::{
    InterfaceKind, NetworkInterface, WifiNetwork, band_for_channel, quality_percent,
    vendor_for_mac,
};

/// First IPv4 address in `ip addr show <dev>` output.
pub fn parse_ip_addr(output: &str) -> Option<String> {
    let re = Regex::new(r"inet (\d+\.\d+\.\d+\.\d+)").unwrap();
    re.captures(output).map(|cap| cap[1].to_string())
}

/// Wireless fields from `iwconfig <dev>` output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IwconfigInfo {
    pub is_wifi: bool,
    pub signal_dbm: Option<i32>,
    pub frequency_ghz: Option<f64>,
    pub power_save_on: bool,
}

pub fn parse_iwconfig(output: &str) -> IwconfigInfo {
    let is_wifi = output.contains("IEEE 802.11");
    if !is_wifi {
        return IwconfigInfo::default();
    }

    let signal_re = Regex::new(r"Signal level=(-?\d+)").unwrap();
    let freq_re = Regex::new(r"Frequency:(\d+\.\d+)").unwrap();

    IwconfigInfo {
        is_wifi,
        signal_dbm: signal_re
            .captures(output)
            .and_then(|cap| cap[1].parse().ok()),
        frequency_ghz: freq_re
            .captures(output)
            .and_then(|cap| cap[1].parse().ok()),
        power_save_on: output.contains("Power Management:on"),
    }
}

/// Current channel from `iwlist <dev> channel` output.
pub fn parse_current_channel(output: &str) -> Option<u32> {
    let re = Regex::new(r"Current Frequency.*Channel (\d+)").unwrap();
    re.captures(output).and_then(|cap| cap[1].parse().ok())
}

fn band_label(channel: Option<u32>, frequency_ghz: Option<f64>) -> Option<String> {
    match (channel, frequency_ghz) {
        (Some(c), _) => Some(band_for_channel(c).to_string()),
        (None, Some(f)) if f < 3.0 => Some("2.4 GHz".to_string()),
        (None, Some(_)) => Some("5 GHz".to_string()),
        (None, None) => None,
    }
}

/// Parse `iwlist <dev> scan` output: one block per "Cell NN - Address: ..".
/// Missing fields degrade to the documented defaults ("Hidden", empty BSSID,
/// channel 0, -100 dBm).
pub fn parse_iwlist_scan(output: &str) -> Vec<WifiNetwork> {
    let ssid_re = Regex::new(r#"ESSID:"([^"]*)""#).unwrap();
    let bssid_re = Regex::new(r"Address: ([A-Fa-f0-9:]{17})").unwrap();
    let channel_re = Regex::new(r"Channel:(\d+)").unwrap();
    let signal_re = Regex::new(r"Signal level=(-?\d+)").unwrap();

    let mut networks = Vec::new();
    for cell in output.split("Cell ").skip(1) {
        let ssid = ssid_re
            .captures(cell)
            .map(|cap| cap[1].to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Hidden".to_string());
        let bssid = bssid_re
            .captures(cell)
            .map(|cap| cap[1].to_string())
            .unwrap_or_default();
        let channel = channel_re
            .captures(cell)
            .and_then(|cap| cap[1].parse().ok())
            .unwrap_or(0);
        let signal = signal_re
            .captures(cell)
            .and_then(|cap| cap[1].parse().ok())
            .unwrap_or(-100);

        let encryption = if cell.contains("Encryption key:on") {
            if cell.contains("WPA2") {
                "WPA2"
            } else if cell.contains("WPA") {
                "WPA"
            } else {
                "WEP"
            }
        } else {
            "Open"
        };

        networks.push(WifiNetwork {
            ssid,
            vendor: vendor_for_mac(&bssid).map(str::to_string),
            bssid,
            channel,
            frequency: band_for_channel(channel).to_string(),
            signal_dbm: signal,
            quality: quality_percent(signal),
            encryption: encryption.to_string(),
        });
    }

    networks
}

async fn list_sysfs_interfaces() -> Vec<String> {
    let mut names = Vec::new();
    match tokio::fs::read_dir("/sys/class/net").await {
        Ok(mut entries) => {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name != "lo" {
                    names.push(name);
                }
            }
        }
        Err(err) => warn!(error = %err, "cannot enumerate /sys/class/net"),
    }
    names.sort();
    names
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

/// Enumerate interfaces from sysfs and probe each with ip/iwconfig.
pub async fn collect_interfaces() -> Vec<NetworkInterface> {
    let mut interfaces = Vec::new();

    for name in list_sysfs_interfaces().await {
        let addr_out = run_command("ip", &["addr", "show", &name], DEFAULT_TIMEOUT).await;
        if !addr_out.succeeded {
            debug!(device = %name, error = %addr_out.stderr, "ip addr show failed");
            continue;
        }
        let ip_address = parse_ip_addr(&addr_out.stdout);

        let iw_out = run_command("iwconfig", &[&name], DEFAULT_TIMEOUT).await;
        let wireless = if iw_out.succeeded {
            parse_iwconfig(&iw_out.stdout)
        } else {
            IwconfigInfo::default()
        };

        let channel = if wireless.is_wifi {
            let chan_out = run_command("iwlist", &[&name, "channel"], DEFAULT_TIMEOUT).await;
            if chan_out.succeeded {
                parse_current_channel(&chan_out.stdout)
            } else {
                None
            }
        } else {
            None
        };

        interfaces.push(NetworkInterface {
            name: name.clone(),
            kind: if wireless.is_wifi {
                InterfaceKind::WiFi
            } else {
                InterfaceKind::Ethernet
            },
            status: if ip_address.is_some() { "up" } else { "down" }.to_string(),
            mac_address: read_sysfs_mac(&name).await,
            ip_address,
            gateway: None,
            dns_servers: Vec::new(),
            signal_dbm: wireless.signal_dbm,
            frequency: band_label(channel, wireless.frequency_ghz),
            channel,
        });
    }

    interfaces
}

/// Scan each WiFi interface with `iwlist scan` under the long scan timeout.
pub async fn scan_networks(interfaces: &[NetworkInterface]) -> Vec<WifiNetwork> {
    let mut networks = Vec::new();

    for iface in interfaces.iter().filter(|i| i.is_wifi()) {
        let scan = run_command("iwlist", &[&iface.name, "scan"], SCAN_TIMEOUT).await;
        if scan.succeeded {
            networks.extend(parse_iwlist_scan(&scan.stdout));
        } else {
            warn!(device = %iface.name, error = %scan.stderr, "iwlist scan failed");
        }
    }

    networks
}

#[cfg(test)]
mod tests {
    use super::*;

    const IWCONFIG_WIFI: &str = "\
wlan0     IEEE 802.11  ESSID:\"HomeNet\"
          Mode:Managed  Frequency:2.437 GHz  Access Point: A4:5E:60:00:11:22
          Bit Rate=130 Mb/s   Tx-Power=22 dBm
          Power Management:on
          Link Quality=52/70  Signal level=-58 dBm
";

    #[test]
    fn ip_addr_extraction() {
        let output = "\
2: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500
    inet 10.0.0.7/24 brd 10.0.0.255 scope global dynamic wlan0
";
        assert_eq!(parse_ip_addr(output), Some("10.0.0.7".to_string()));
        assert_eq!(parse_ip_addr("3: eth0: <NO-CARRIER> mtu 1500"), None);
    }

    #[test]
    fn iwconfig_wireless_fields() {
        let info = parse_iwconfig(IWCONFIG_WIFI);
        assert!(info.is_wifi);
        assert_eq!(info.signal_dbm, Some(-58));
        assert_eq!(info.frequency_ghz, Some(2.437));
        assert!(info.power_save_on);
    }

    #[test]
    fn iwconfig_wired_interface() {
        let info = parse_iwconfig("eth0      no wireless extensions.\n");
        assert_eq!(info, IwconfigInfo::default());
    }

    #[test]
    fn current_channel_extraction() {
        let output = "\
wlan0     32 channels in total; available frequencies :
          Channel 01 : 2.412 GHz
          Current Frequency:2.437 GHz (Channel 6)
";
        assert_eq!(parse_current_channel(output), Some(6));
        assert_eq!(parse_current_channel("wlan0  no frequency information."), None);
    }

    #[test]
    fn band_label_prefers_channel() {
        assert_eq!(band_label(Some(44), Some(2.437)).as_deref(), Some("5 GHz"));
        assert_eq!(band_label(None, Some(2.437)).as_deref(), Some("2.4 GHz"));
        assert_eq!(band_label(None, Some(5.22)).as_deref(), Some("5 GHz"));
        assert_eq!(band_label(None, None), None);
    }

    #[test]
    fn iwlist_scan_cells() {
        let output = "\
wlan0     Scan completed :
          Cell 01 - Address: A4:5E:60:00:11:22
                    Channel:6
                    Quality=60/70  Signal level=-48 dBm
                    Encryption key:on
                    ESSID:\"HomeNet\"
                    IE: IEEE 802.11i/WPA2 Version 1
          Cell 02 - Address: DE:AD:BE:EF:00:01
                    Channel:44
                    Quality=30/70  Signal level=-77 dBm
                    Encryption key:off
                    ESSID:\"\"
";
        let networks = parse_iwlist_scan(output);
        assert_eq!(networks.len(), 2);

        assert_eq!(networks[0].ssid, "HomeNet");
        assert_eq!(networks[0].bssid, "A4:5E:60:00:11:22");
        assert_eq!(networks[0].channel, 6);
        assert_eq!(networks[0].frequency, "2.4 GHz");
        assert_eq!(networks[0].signal_dbm, -48);
        assert_eq!(networks[0].quality, 100);
        assert_eq!(networks[0].encryption, "WPA2");
        assert_eq!(networks[0].vendor.as_deref(), Some("Apple"));

        assert_eq!(networks[1].ssid, "Hidden");
        assert_eq!(networks[1].frequency, "5 GHz");
        assert_eq!(networks[1].encryption, "Open");
        assert_eq!(networks[1].quality, 30);
    }

    #[test]
    fn iwlist_scan_missing_fields_default() {
        let output = "Cell 01 - Address: not-a-mac\n";
        let networks = parse_iwlist_scan(output);
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "Hidden");
        assert_eq!(networks[0].bssid, "");
        assert_eq!(networks[0].channel, 0);
        assert_eq!(networks[0].signal_dbm, -100);
        assert_eq!(networks[0].quality, 10);
    }
}
