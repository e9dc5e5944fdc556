use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a detected issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{}", name)
    }
}

/// The fixed catalogue of known issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NoInternet,
    SlowDns,
    WeakSignal,
    ChannelCongestion,
    IpConflict,
    MdnsHighCpu,
    VpnDnsCorrupt,
    NetworkManagerInactive,
    WifiPowerSave,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::NoInternet => "no_internet",
            IssueKind::SlowDns => "slow_dns",
            IssueKind::WeakSignal => "weak_signal",
            IssueKind::ChannelCongestion => "channel_congestion",
            IssueKind::IpConflict => "ip_conflict",
            IssueKind::MdnsHighCpu => "mdns_high_cpu",
            IssueKind::VpnDnsCorrupt => "vpn_dns_corrupt",
            IssueKind::NetworkManagerInactive => "network_manager_inactive",
            IssueKind::WifiPowerSave => "wifi_power_save",
        };
        write!(f, "{}", name)
    }
}

/// A single detected issue with a suggested remediation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        description: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Outcome of one attempted remediation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResult {
    pub kind: IssueKind,
    /// What was actually done, e.g. "Restarted systemd-resolved".
    pub action: String,
    pub success: bool,
}

impl FixResult {
    pub fn new(kind: IssueKind, action: impl Into<String>, success: bool) -> Self {
        Self {
            kind,
            action: action.into(),
            success,
        }
    }
}

/// Outcome of one applied performance optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimization {
    pub label: String,
    pub description: String,
    pub success: bool,
}
