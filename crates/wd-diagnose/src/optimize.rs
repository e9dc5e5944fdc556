//! Performance optimizations: sequential best-effort command actions with a
//! recorded outcome per applied action.

use tracing::{info, warn};
use wd_core::Optimization;
use wd_probe::runner::{DEFAULT_TIMEOUT, run_command, run_shell};
use wd_probe::{Platform, ProbeStrategy};

const SYSCTL_BUFFER_LINES: &[&str] = &[
    "net.core.rmem_max = 16777216",
    "net.core.wmem_max = 16777216",
    "net.ipv4.tcp_rmem = 4096 65536 16777216",
    "net.ipv4.tcp_wmem = 4096 65536 16777216",
];

/// Apply the platform's optimization set, recording one entry per action
/// that succeeded.
pub async fn apply(strategy: &ProbeStrategy) -> Vec<Optimization> {
    info!("optimizing network performance");
    let optimizations = match strategy.platform {
        Platform::MacOs => macos_optimizations().await,
        Platform::Linux => linux_optimizations().await,
    };
    info!(count = optimizations.len(), "optimizations applied");
    optimizations
}

async fn macos_optimizations() -> Vec<Optimization> {
    let mut applied = Vec::new();

    let dns = run_command(
        "networksetup",
        &["-setdnsservers", "Wi-Fi", "1.1.1.1", "8.8.8.8", "8.8.4.4"],
        DEFAULT_TIMEOUT,
    )
    .await;
    if dns.succeeded {
        applied.push(Optimization {
            label: "dns_servers".to_string(),
            description: "Set optimized DNS servers (Cloudflare + Google)".to_string(),
            success: true,
        });
    } else {
        warn!(error = %dns.stderr, "setting DNS servers failed");
    }

    let order = run_command(
        "networksetup",
        &["-ordernetworkservices", "Wi-Fi", "Ethernet"],
        DEFAULT_TIMEOUT,
    )
    .await;
    if order.succeeded {
        applied.push(Optimization {
            label: "interface_priority".to_string(),
            description: "Optimized network interface priority".to_string(),
            success: true,
        });
    }

    applied
}

async fn linux_optimizations() -> Vec<Optimization> {
    let mut applied = Vec::new();

    let resolved = run_command("systemctl", &["enable", "systemd-resolved"], DEFAULT_TIMEOUT).await;
    if resolved.succeeded {
        applied.push(Optimization {
            label: "dns_resolver".to_string(),
            description: "Enabled systemd-resolved for better DNS performance".to_string(),
            success: true,
        });
    } else {
        warn!(error = %resolved.stderr, "enabling systemd-resolved failed");
    }

    // One successful append is enough to record the buffer tuning.
    for line in SYSCTL_BUFFER_LINES {
        let append = run_shell(
            &format!("echo '{}' >> /etc/sysctl.conf", line),
            DEFAULT_TIMEOUT,
        )
        .await;
        if append.succeeded {
            applied.push(Optimization {
                label: "network_buffers".to_string(),
                description: "Optimized network buffers".to_string(),
                success: true,
            });
            break;
        }
    }

    applied
}
