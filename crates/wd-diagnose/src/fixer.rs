//! Remediation dispatcher: a static mapping from issue kind to remediation
//! commands. Issues without a mapped action are left alone — "no automatic
//! fix available" is a valid terminal outcome, not a failure.

use tracing::{debug, info};
use wd_core::{FixResult, Issue, IssueKind, NetworkInterface};
use wd_probe::runner::{DEFAULT_TIMEOUT, run_command};
use wd_probe::{Platform, ProbeStrategy};

/// Whether the dispatcher has a remediation for this issue kind.
/// `WeakSignal` has none; a weak radio link cannot be fixed from software.
pub fn has_automatic_fix(kind: IssueKind) -> bool {
    matches!(
        kind,
        IssueKind::SlowDns
            | IssueKind::MdnsHighCpu
            | IssueKind::VpnDnsCorrupt
            | IssueKind::NetworkManagerInactive
            | IssueKind::WifiPowerSave
    )
}

pub struct Fixer {
    strategy: ProbeStrategy,
}

impl Fixer {
    pub fn new(strategy: ProbeStrategy) -> Self {
        Self { strategy }
    }

    /// Attempt a remediation for every detected issue. Fire-and-forget with
    /// an observed outcome; no rollback on partial failure.
    pub async fn apply_all(
        &self,
        issues: &[Issue],
        interfaces: &[NetworkInterface],
    ) -> Vec<FixResult> {
        info!("applying automatic fixes");
        let mut results = Vec::new();

        for issue in issues {
            if let Some(result) = self.apply(issue, interfaces).await {
                results.push(result);
            } else {
                debug!(kind = %issue.kind, "no automatic fix available");
            }
        }

        info!(count = results.len(), "fixes applied");
        results
    }

    async fn apply(&self, issue: &Issue, interfaces: &[NetworkInterface]) -> Option<FixResult> {
        match issue.kind {
            IssueKind::SlowDns => Some(self.fix_slow_dns().await),
            IssueKind::MdnsHighCpu => Some(self.restart_mdns(IssueKind::MdnsHighCpu).await),
            IssueKind::VpnDnsCorrupt => Some(self.fix_vpn_dns().await),
            IssueKind::NetworkManagerInactive => Some(self.start_network_manager().await),
            IssueKind::WifiPowerSave => Some(self.disable_power_save(interfaces).await),
            // No honest automatic remediation exists for these.
            IssueKind::NoInternet
            | IssueKind::WeakSignal
            | IssueKind::ChannelCongestion
            | IssueKind::IpConflict => None,
        }
    }

    async fn fix_slow_dns(&self) -> FixResult {
        match self.strategy.platform {
            Platform::MacOs => {
                let flush = run_command("dscacheutil", &["-flushcache"], DEFAULT_TIMEOUT).await;
                let hup =
                    run_command("killall", &["-HUP", "mDNSResponder"], DEFAULT_TIMEOUT).await;
                FixResult::new(
                    IssueKind::SlowDns,
                    "Flushed DNS cache and restarted mDNSResponder",
                    flush.succeeded && hup.succeeded,
                )
            }
            Platform::Linux => {
                let restart = run_command(
                    "systemctl",
                    &["restart", "systemd-resolved"],
                    DEFAULT_TIMEOUT,
                )
                .await;
                FixResult::new(
                    IssueKind::SlowDns,
                    "Restarted systemd-resolved",
                    restart.succeeded,
                )
            }
        }
    }

    async fn restart_mdns(&self, kind: IssueKind) -> FixResult {
        let hup = run_command("killall", &["-HUP", "mDNSResponder"], DEFAULT_TIMEOUT).await;
        FixResult::new(kind, "Restarted mDNSResponder", hup.succeeded)
    }

    async fn fix_vpn_dns(&self) -> FixResult {
        let flush = run_command("dscacheutil", &["-flushcache"], DEFAULT_TIMEOUT).await;
        let hup = run_command("killall", &["-HUP", "mDNSResponder"], DEFAULT_TIMEOUT).await;
        FixResult::new(
            IssueKind::VpnDnsCorrupt,
            "Cleared VPN DNS cache",
            flush.succeeded && hup.succeeded,
        )
    }

    async fn start_network_manager(&self) -> FixResult {
        let start = run_command("systemctl", &["start", "NetworkManager"], DEFAULT_TIMEOUT).await;
        FixResult::new(
            IssueKind::NetworkManagerInactive,
            "Started NetworkManager service",
            start.succeeded,
        )
    }

    async fn disable_power_save(&self, interfaces: &[NetworkInterface]) -> FixResult {
        for iface in interfaces.iter().filter(|i| i.is_wifi()) {
            let off = run_command("iwconfig", &[&iface.name, "power", "off"], DEFAULT_TIMEOUT).await;
            if off.succeeded {
                return FixResult::new(
                    IssueKind::WifiPowerSave,
                    format!("Disabled power management on {}", iface.name),
                    true,
                );
            }
        }
        FixResult::new(
            IssueKind::WifiPowerSave,
            "Failed to disable power management",
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_kinds_have_no_fix() {
        assert!(!has_automatic_fix(IssueKind::NoInternet));
        assert!(!has_automatic_fix(IssueKind::WeakSignal));
        assert!(!has_automatic_fix(IssueKind::ChannelCongestion));
        assert!(!has_automatic_fix(IssueKind::IpConflict));
    }

    #[test]
    fn mapped_kinds_have_a_fix() {
        assert!(has_automatic_fix(IssueKind::SlowDns));
        assert!(has_automatic_fix(IssueKind::MdnsHighCpu));
        assert!(has_automatic_fix(IssueKind::VpnDnsCorrupt));
        assert!(has_automatic_fix(IssueKind::NetworkManagerInactive));
        assert!(has_automatic_fix(IssueKind::WifiPowerSave));
    }
}
