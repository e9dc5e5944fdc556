use crate::issue::{FixResult, Issue, Optimization, Severity};
use crate::model::{NetworkInterface, PerformanceSample, WifiNetwork};
use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Aggregate counts for the tail of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_interfaces: usize,
    pub active_interfaces: usize,
    pub wifi_networks_found: usize,
    pub issues_found: usize,
    pub fixes_applied: usize,
}

/// Complete diagnostic report for one run.
///
/// Built once from the records a run collected; rebuilding from the same
/// records yields identical JSON apart from the timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub system: String,
    pub interfaces: Vec<NetworkInterface>,
    pub wifi_networks: Vec<WifiNetwork>,
    pub performance: Option<PerformanceSample>,
    pub issues: Vec<Issue>,
    pub fixes: Vec<FixResult>,
    pub optimizations: Vec<Optimization>,
    pub summary: ReportSummary,
}

impl Report {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        system: impl Into<String>,
        interfaces: Vec<NetworkInterface>,
        wifi_networks: Vec<WifiNetwork>,
        performance: Option<PerformanceSample>,
        issues: Vec<Issue>,
        fixes: Vec<FixResult>,
        optimizations: Vec<Optimization>,
    ) -> Self {
        let summary = ReportSummary {
            total_interfaces: interfaces.len(),
            active_interfaces: interfaces.iter().filter(|i| i.is_active()).count(),
            wifi_networks_found: wifi_networks.len(),
            issues_found: issues.len(),
            fixes_applied: fixes.len(),
        };

        Self {
            timestamp: Local::now().to_rfc3339(),
            system: system.into(),
            interfaces,
            wifi_networks,
            performance,
            issues,
            fixes,
            optimizations,
            summary,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn display(&self) {
        println!("\n📋 WiFi Doctor Report — {}", self.timestamp);
        println!("💻 System: {}\n", self.system);

        println!("🔌 Interfaces ({}):", self.interfaces.len());
        if self.interfaces.is_empty() {
            println!("  (none)");
        }
        for iface in &self.interfaces {
            let state_icon = if iface.is_active() { "✅" } else { "❌" };
            println!("  {} {} ({:?}) [{}]", state_icon, iface.name, iface.kind, iface.status);
            if let Some(ip) = &iface.ip_address {
                println!("     IP: {}", ip);
            }
            if let Some(signal) = iface.signal_dbm {
                println!("     Signal: {} dBm", signal);
            }
            if let Some(channel) = iface.channel {
                let band = iface.frequency.as_deref().unwrap_or("?");
                println!("     Channel: {} ({})", channel, band);
            }
        }

        if !self.wifi_networks.is_empty() {
            println!("\n📡 WiFi networks ({}):", self.wifi_networks.len());

            // Strongest first, top ten only.
            let mut sorted: Vec<&WifiNetwork> = self.wifi_networks.iter().collect();
            sorted.sort_by_key(|n| std::cmp::Reverse(n.signal_dbm));

            for network in sorted.iter().take(10) {
                println!("  • {}", network.ssid);
                println!(
                    "     Signal: {} dBm ({}%) — channel {} ({}), {}",
                    network.signal_dbm,
                    network.quality,
                    network.channel,
                    network.frequency,
                    network.encryption
                );
                if let Some(vendor) = &network.vendor {
                    println!("     Vendor: {}", vendor);
                }
            }
        }

        if let Some(perf) = &self.performance {
            println!("\n🚀 Performance:");
            println!("  ⬇️  Download: {:.1} Mbps", perf.download_mbps);
            println!("  ⬆️  Upload: {:.1} Mbps", perf.upload_mbps);
            println!(
                "  🏓 Latency: {:.1} ms (jitter {:.1} ms, loss {:.1}%)",
                perf.latency_ms, perf.jitter_ms, perf.packet_loss_pct
            );
            println!("  🔍 DNS resolution: {:.1} ms", perf.dns_resolution_ms);
        }

        if self.issues.is_empty() {
            println!("\n✅ No issues detected");
        } else {
            println!("\n⚠️  Issues detected ({}):", self.issues.len());
            for issue in &self.issues {
                let icon = match issue.severity {
                    Severity::Critical => "🔴",
                    Severity::High => "🟡",
                    Severity::Medium | Severity::Low => "🟠",
                };
                println!("  {} [{}] {}", icon, issue.severity, issue.description);
                println!("     💡 {}", issue.suggestion);
            }
        }

        if !self.fixes.is_empty() {
            println!("\n🔧 Fixes applied ({}):", self.fixes.len());
            for fix in &self.fixes {
                let icon = if fix.success { "✅" } else { "❌" };
                println!("  {} {}", icon, fix.action);
            }
        }

        if !self.optimizations.is_empty() {
            println!("\n⚡ Optimizations ({}):", self.optimizations.len());
            for opt in &self.optimizations {
                let icon = if opt.success { "✅" } else { "❌" };
                println!("  {} {}", icon, opt.description);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InterfaceKind;

    fn sample_interface(name: &str, status: &str) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            kind: InterfaceKind::WiFi,
            status: status.to_string(),
            mac_address: "aa:bb:cc:dd:ee:ff".to_string(),
            ip_address: Some("192.168.1.10".to_string()),
            gateway: None,
            dns_servers: vec![],
            signal_dbm: Some(-55),
            frequency: Some("2.4 GHz".to_string()),
            channel: Some(6),
        }
    }

    #[test]
    fn summary_counts_active_interfaces() {
        let report = Report::build(
            "Linux",
            vec![
                sample_interface("wlan0", "connected"),
                sample_interface("eth0", "down"),
            ],
            vec![],
            None,
            vec![],
            vec![],
            vec![],
        );

        assert_eq!(report.summary.total_interfaces, 2);
        assert_eq!(report.summary.active_interfaces, 1);
        assert_eq!(report.summary.issues_found, 0);
    }

    #[test]
    fn rebuild_differs_only_in_timestamp() {
        let interfaces = vec![sample_interface("wlan0", "up")];
        let a = Report::build("Linux", interfaces.clone(), vec![], None, vec![], vec![], vec![]);
        let b = Report::build("Linux", interfaces, vec![], None, vec![], vec![], vec![]);

        let mut va: serde_json::Value = serde_json::from_str(&a.to_json().unwrap()).unwrap();
        let mut vb: serde_json::Value = serde_json::from_str(&b.to_json().unwrap()).unwrap();
        va["timestamp"] = serde_json::Value::Null;
        vb["timestamp"] = serde_json::Value::Null;
        assert_eq!(va, vb);
    }
}
