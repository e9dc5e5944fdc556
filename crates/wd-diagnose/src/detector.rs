//! Issue detection: independent rules over already-collected records plus
//! command-backed platform checks. No rule short-circuits another; every
//! qualifying interface, channel or address gets its own issue.

use crate::probes;
use tracing::info;
use wd_core::{Issue, IssueKind, NetworkInterface, PerformanceSample, Severity, WifiNetwork};
use wd_probe::{Platform, ProbeStrategy, perf};

/// Signals weaker than this on a connected WiFi interface are reported.
const WEAK_SIGNAL_DBM: i32 = -70;
/// Channels carrying more than this many networks are congested.
const CONGESTION_LIMIT: usize = 3;
/// DNS resolution slower than this is reported.
const SLOW_DNS_MS: f64 = 1000.0;

/// Slow DNS: latest resolution sample above the threshold.
pub fn check_slow_dns(performance: &PerformanceSample) -> Option<Issue> {
    if performance.dns_resolution_ms > SLOW_DNS_MS {
        Some(Issue::new(
            IssueKind::SlowDns,
            Severity::High,
            format!(
                "Slow DNS resolution ({:.0} ms)",
                performance.dns_resolution_ms
            ),
            "Optimize DNS servers or flush the DNS cache",
        ))
    } else {
        None
    }
}

/// Weak signal: one issue per WiFi interface with a reported signal below
/// the threshold.
pub fn check_weak_signals(interfaces: &[NetworkInterface]) -> Vec<Issue> {
    interfaces
        .iter()
        .filter(|iface| iface.is_wifi())
        .filter_map(|iface| {
            let signal = iface.signal_dbm?;
            (signal < WEAK_SIGNAL_DBM).then(|| {
                Issue::new(
                    IssueKind::WeakSignal,
                    Severity::Medium,
                    format!("Weak WiFi signal on {} ({} dBm)", iface.name, signal),
                    "Move closer to the router or check for interference",
                )
            })
        })
        .collect()
}

/// Channel congestion: one issue per channel carrying more than the limit,
/// enumerated in first-seen channel order.
pub fn check_channel_congestion(networks: &[WifiNetwork]) -> Vec<Issue> {
    let mut usage: Vec<(u32, usize)> = Vec::new();
    for network in networks {
        match usage.iter_mut().find(|(ch, _)| *ch == network.channel) {
            Some((_, count)) => *count += 1,
            None => usage.push((network.channel, 1)),
        }
    }

    usage
        .into_iter()
        .filter(|(_, count)| *count > CONGESTION_LIMIT)
        .map(|(channel, count)| {
            Issue::new(
                IssueKind::ChannelCongestion,
                Severity::Medium,
                format!("Channel {} has {} networks", channel, count),
                "Switch to a less congested channel",
            )
        })
        .collect()
}

/// IP conflict: one issue per address shared by two or more active
/// interfaces; the first duplicate encountered per address is reported.
pub fn check_ip_conflicts(interfaces: &[NetworkInterface]) -> Vec<Issue> {
    let mut seen: Vec<&str> = Vec::new();
    let mut reported: Vec<&str> = Vec::new();
    let mut issues = Vec::new();

    for iface in interfaces.iter().filter(|i| i.is_active()) {
        let Some(ip) = iface.ip_address.as_deref() else {
            continue;
        };
        if seen.contains(&ip) {
            if !reported.contains(&ip) {
                reported.push(ip);
                issues.push(Issue::new(
                    IssueKind::IpConflict,
                    Severity::High,
                    format!("IP conflict detected: {}", ip),
                    "Release and renew the IP address",
                ));
            }
        } else {
            seen.push(ip);
        }
    }

    issues
}

/// Runs the full rule set for one diagnostic pass.
pub struct IssueDetector {
    strategy: ProbeStrategy,
}

impl IssueDetector {
    pub fn new(strategy: ProbeStrategy) -> Self {
        Self { strategy }
    }

    pub async fn detect(
        &self,
        interfaces: &[NetworkInterface],
        networks: &[WifiNetwork],
        performance: Option<&PerformanceSample>,
    ) -> anyhow::Result<Vec<Issue>> {
        info!("diagnosing network issues");
        let mut issues = Vec::new();

        if !perf::check_connectivity().await {
            issues.push(Issue::new(
                IssueKind::NoInternet,
                Severity::Critical,
                "No internet connectivity detected",
                "Check the network connection and DNS settings",
            ));
        }

        if let Some(performance) = performance {
            issues.extend(check_slow_dns(performance));
        }
        issues.extend(check_weak_signals(interfaces));
        issues.extend(check_channel_congestion(networks));
        issues.extend(check_ip_conflicts(interfaces));

        match self.strategy.platform {
            Platform::MacOs => issues.extend(probes::macos_checks().await),
            Platform::Linux => issues.extend(probes::linux_checks(interfaces).await),
        }

        info!(count = issues.len(), "issue detection finished");
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wd_core::InterfaceKind;

    fn iface(
        name: &str,
        kind: InterfaceKind,
        status: &str,
        ip: Option<&str>,
        signal: Option<i32>,
    ) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            kind,
            status: status.to_string(),
            mac_address: String::new(),
            ip_address: ip.map(str::to_string),
            gateway: None,
            dns_servers: vec![],
            signal_dbm: signal,
            frequency: None,
            channel: None,
        }
    }

    fn network_on(channel: u32) -> WifiNetwork {
        WifiNetwork {
            ssid: format!("net-{}", channel),
            bssid: String::new(),
            channel,
            frequency: "2.4 GHz".to_string(),
            signal_dbm: -60,
            quality: 70,
            encryption: "WPA2".to_string(),
            vendor: None,
        }
    }

    fn sample(dns_ms: f64) -> PerformanceSample {
        PerformanceSample {
            download_mbps: 50.0,
            upload_mbps: 10.0,
            latency_ms: 20.0,
            jitter_ms: 1.0,
            packet_loss_pct: 0.0,
            dns_resolution_ms: dns_ms,
        }
    }

    #[test]
    fn slow_dns_threshold() {
        let issue = check_slow_dns(&sample(1500.0)).unwrap();
        assert_eq!(issue.kind, IssueKind::SlowDns);
        assert_eq!(issue.severity, Severity::High);
        assert!(check_slow_dns(&sample(200.0)).is_none());
    }

    #[test]
    fn weak_signal_reports_every_qualifying_interface() {
        let interfaces = vec![
            iface("wlan0", InterfaceKind::WiFi, "up", None, Some(-75)),
            iface("wlan1", InterfaceKind::WiFi, "up", None, Some(-82)),
            iface("wlan2", InterfaceKind::WiFi, "up", None, Some(-55)),
            iface("wlan3", InterfaceKind::WiFi, "up", None, None),
            iface("eth0", InterfaceKind::Ethernet, "up", None, Some(-90)),
        ];
        let issues = check_weak_signals(&interfaces);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].description.contains("wlan0"));
        assert!(issues[1].description.contains("wlan1"));
    }

    #[test]
    fn congestion_counts_per_channel() {
        let networks: Vec<WifiNetwork> =
            [1, 1, 1, 1, 6, 6].iter().map(|c| network_on(*c)).collect();
        let issues = check_channel_congestion(&networks);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::ChannelCongestion);
        assert!(issues[0].description.contains("Channel 1"));
        assert!(issues[0].description.contains("4 networks"));
    }

    #[test]
    fn congestion_none_below_limit() {
        let networks: Vec<WifiNetwork> = [1, 1, 1, 6].iter().map(|c| network_on(*c)).collect();
        assert!(check_channel_congestion(&networks).is_empty());
    }

    #[test]
    fn ip_conflict_ignores_inactive_interfaces() {
        let interfaces = vec![
            iface("eth0", InterfaceKind::Ethernet, "active", Some("192.168.1.5"), None),
            iface("wlan0", InterfaceKind::WiFi, "active", Some("192.168.1.5"), None),
            iface("eth1", InterfaceKind::Ethernet, "inactive", Some("192.168.1.5"), None),
        ];
        let issues = check_ip_conflicts(&interfaces);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("192.168.1.5"));
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn ip_conflict_reports_once_per_address() {
        let interfaces = vec![
            iface("a", InterfaceKind::Ethernet, "up", Some("10.0.0.2"), None),
            iface("b", InterfaceKind::Ethernet, "up", Some("10.0.0.2"), None),
            iface("c", InterfaceKind::Ethernet, "up", Some("10.0.0.2"), None),
            iface("d", InterfaceKind::Ethernet, "up", Some("10.0.0.9"), None),
        ];
        assert_eq!(check_ip_conflicts(&interfaces).len(), 1);
    }
}
