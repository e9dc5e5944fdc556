use serde::{Deserialize, Serialize};

/// Kind of a detected network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceKind {
    WiFi,
    Ethernet,
}

/// One network interface as reported by the platform tooling.
///
/// Fields that the underlying tool did not report stay at their documented
/// default (`None`, empty string, empty vec). Built once per detection pass
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub kind: InterfaceKind,
    /// Free-text state as reported: "active"/"inactive" (macOS),
    /// "up"/"down" (legacy Linux) or an nmcli state like "connected".
    pub status: String,
    /// Empty string when the MAC could not be read.
    pub mac_address: String,
    pub ip_address: Option<String>,
    pub gateway: Option<String>,
    /// Deduplicated, order not significant.
    pub dns_servers: Vec<String>,
    /// dBm, non-positive when present.
    pub signal_dbm: Option<i32>,
    /// Band label, e.g. "2.4 GHz".
    pub frequency: Option<String>,
    pub channel: Option<u32>,
}

impl NetworkInterface {
    pub fn is_wifi(&self) -> bool {
        self.kind == InterfaceKind::WiFi
    }

    /// Whether the interface counts as up for conflict/summary purposes.
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "active" | "up" | "connected")
    }
}

/// One WiFi network observed during a scan. A rescan produces a fresh set;
/// there is no identity beyond structural equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiNetwork {
    /// May be empty or "Hidden" for networks that do not broadcast an SSID.
    pub ssid: String,
    /// Empty when the scan tool does not report BSSIDs (nmcli table output).
    pub bssid: String,
    pub channel: u32,
    /// Band label derived from the channel.
    pub frequency: String,
    pub signal_dbm: i32,
    /// 0-100, derived from signal_dbm.
    pub quality: u8,
    /// Free text, e.g. "WPA2", "Open".
    pub encryption: String,
    /// OUI vendor label, when the BSSID prefix is known.
    pub vendor: Option<String>,
}

/// Result of one performance test run. Overwritten by each new test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub latency_ms: f64,
    /// Mean absolute difference between consecutive ping round trips.
    pub jitter_ms: f64,
    pub packet_loss_pct: f64,
    /// Averaged over the fixed DNS probe set.
    pub dns_resolution_ms: f64,
}
