//! Command-backed platform checks that complement the pure detector rules.

use tracing::debug;
use wd_core::{Issue, IssueKind, NetworkInterface, Severity};
use wd_probe::legacy::parse_iwconfig;
use wd_probe::runner::{DEFAULT_TIMEOUT, run_command, run_shell};

/// mDNSResponder CPU above this fraction of a core is worth flagging.
const MDNS_CPU_THRESHOLD: f64 = 10.0;

/// Extract %CPU values (third `ps aux` column) from a pre-filtered process
/// listing; one entry per line that parses.
pub fn parse_cpu_usage(ps_output: &str) -> Vec<f64> {
    ps_output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            parts.get(2).and_then(|cpu| cpu.parse().ok())
        })
        .collect()
}

/// VPN resolvers appear as resolver #8 in `scutil --dns`; a block there
/// without any nameserver entry indicates a corrupted VPN DNS setup.
pub fn vpn_resolver_corrupted(scutil_output: &str) -> bool {
    let Some(after) = scutil_output.split("resolver #8").nth(1) else {
        return false;
    };
    let block = after.split("resolver #9").next().unwrap_or(after);
    !block.contains("nameserver")
}

pub async fn macos_checks() -> Vec<Issue> {
    let mut issues = Vec::new();

    let ps = run_shell(
        "ps aux | grep mDNSResponder | grep -v grep",
        DEFAULT_TIMEOUT,
    )
    .await;
    if ps.succeeded {
        for cpu in parse_cpu_usage(&ps.stdout) {
            if cpu > MDNS_CPU_THRESHOLD {
                issues.push(Issue::new(
                    IssueKind::MdnsHighCpu,
                    Severity::Medium,
                    format!("mDNSResponder using {}% CPU", cpu),
                    "Restart the mDNSResponder service",
                ));
            }
        }
    } else {
        debug!("mDNSResponder not running");
    }

    let scutil = run_command("scutil", &["--dns"], DEFAULT_TIMEOUT).await;
    if scutil.succeeded && vpn_resolver_corrupted(&scutil.stdout) {
        issues.push(Issue::new(
            IssueKind::VpnDnsCorrupt,
            Severity::High,
            "VPN DNS configuration may be corrupted",
            "Disconnect and reconnect the VPN, or flush the DNS cache",
        ));
    }

    issues
}

pub async fn linux_checks(interfaces: &[NetworkInterface]) -> Vec<Issue> {
    let mut issues = Vec::new();

    let nm = run_command("systemctl", &["is-active", "NetworkManager"], DEFAULT_TIMEOUT).await;
    if !nm.succeeded || nm.stdout.trim() != "active" {
        issues.push(Issue::new(
            IssueKind::NetworkManagerInactive,
            Severity::High,
            "NetworkManager service is not active",
            "Start the NetworkManager service: sudo systemctl start NetworkManager",
        ));
    }

    for iface in interfaces.iter().filter(|i| i.is_wifi()) {
        let iw = run_command("iwconfig", &[&iface.name], DEFAULT_TIMEOUT).await;
        if iw.succeeded && parse_iwconfig(&iw.stdout).power_save_on {
            issues.push(Issue::new(
                IssueKind::WifiPowerSave,
                Severity::Medium,
                format!("WiFi power management enabled on {}", iface.name),
                "Disable power management for better performance",
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_usage_column_parses() {
        let output = "\
_mdnsresponder   320  12.5  0.1  4301234  9240   ??  Ss     9:01AM  0:42.11 /usr/sbin/mDNSResponder
_mdnsresponder   321   0.0  0.0  4268932  1200   ??  S    9:01AM  0:00.03 /usr/sbin/mDNSResponderHelper
";
        assert_eq!(parse_cpu_usage(output), vec![12.5, 0.0]);
        assert!(parse_cpu_usage("").is_empty());
    }

    #[test]
    fn vpn_resolver_block_with_nameserver_is_fine() {
        let output = "\
resolver #8
  nameserver[0] : 10.8.0.1
resolver #9
  domain : local
";
        assert!(!vpn_resolver_corrupted(output));
    }

    #[test]
    fn vpn_resolver_block_without_nameserver_is_corrupt() {
        let output = "\
resolver #8
  flags    : Request A records
resolver #9
  nameserver[0] : 1.1.1.1
";
        assert!(vpn_resolver_corrupted(output));
    }

    #[test]
    fn no_vpn_resolver_is_fine() {
        assert!(!vpn_resolver_corrupted("resolver #1\n  nameserver[0] : 1.1.1.1\n"));
    }
}
