//! Network performance measurement: DNS latency, ping latency/jitter/loss,
//! throughput via the external speedtest service, and HTTP reachability.

use crate::runner::{DNS_PROBE_TIMEOUT, REACH_TIMEOUT, SPEEDTEST_TIMEOUT, run_command};
use crate::strategy::{DnsProbeTool, ProbeStrategy};
use regex::Regex;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, warn};
use wd_core::PerformanceSample;

const DNS_PROBE_DOMAINS: &[&str] = &["google.com", "cloudflare.com", "github.com"];
const PING_HOSTS: &[&str] = &["8.8.8.8", "1.1.1.1", "google.com"];
const REACHABILITY_URLS: &[&str] = &[
    "http://www.google.com",
    "http://www.cloudflare.com",
    "http://www.github.com",
];

/// Latency, jitter and loss extracted from one ping run.
#[derive(Debug, Clone, PartialEq)]
pub struct PingStats {
    pub latency_ms: f64,
    pub jitter_ms: f64,
    pub packet_loss_pct: f64,
}

/// Parse `ping -c N` output. Latency is the mean of the per-reply round
/// trips, jitter the mean absolute difference between consecutive replies,
/// loss from the "X% packet loss" summary line. None when no reply parsed.
pub fn parse_ping_stats(output: &str) -> Option<PingStats> {
    let time_re = Regex::new(r"time=([0-9]+\.?[0-9]*)").unwrap();
    let loss_re = Regex::new(r"([0-9]+\.?[0-9]*)% packet loss").unwrap();

    let samples: Vec<f64> = time_re
        .captures_iter(output)
        .filter_map(|cap| cap[1].parse().ok())
        .collect();
    if samples.is_empty() {
        return None;
    }

    let latency_ms = samples.iter().sum::<f64>() / samples.len() as f64;
    let jitter_ms = if samples.len() > 1 {
        samples
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .sum::<f64>()
            / (samples.len() - 1) as f64
    } else {
        0.0
    };
    let packet_loss_pct = loss_re
        .captures(output)
        .and_then(|cap| cap[1].parse().ok())
        .unwrap_or(0.0);

    Some(PingStats {
        latency_ms,
        jitter_ms,
        packet_loss_pct,
    })
}

/// speedtest-cli --json payload; speeds are bits per second.
#[derive(Debug, Deserialize)]
pub struct SpeedtestResult {
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
}

pub fn parse_speedtest_json(output: &str) -> Option<SpeedtestResult> {
    serde_json::from_str(output).ok()
}

/// Average wall-clock DNS resolution time in milliseconds over the fixed
/// probe set, counting only probes that succeeded.
pub async fn measure_dns_resolution(tool: DnsProbeTool) -> f64 {
    let mut total_ms = 0.0;
    let mut successes: u32 = 0;

    for domain in DNS_PROBE_DOMAINS {
        let start = Instant::now();
        let out = match tool {
            DnsProbeTool::Dig => {
                run_command("dig", &["+short", domain], DNS_PROBE_TIMEOUT).await
            }
            DnsProbeTool::Nslookup => run_command("nslookup", &[domain], DNS_PROBE_TIMEOUT).await,
        };
        if out.succeeded {
            total_ms += start.elapsed().as_secs_f64() * 1000.0;
            successes += 1;
        } else {
            debug!(domain, error = %out.stderr, "DNS probe failed");
        }
    }

    total_ms / successes.max(1) as f64
}

/// Ping well-known hosts until one answers. All hosts failing degrades to a
/// sentinel sample (999 ms, full loss) rather than an error.
pub async fn measure_ping() -> PingStats {
    for host in PING_HOSTS {
        let out = run_command("ping", &["-c", "3", host], REACH_TIMEOUT).await;
        if out.succeeded {
            if let Some(stats) = parse_ping_stats(&out.stdout) {
                return stats;
            }
        }
        debug!(host, "ping probe failed");
    }

    PingStats {
        latency_ms: 999.0,
        jitter_ms: 0.0,
        packet_loss_pct: 100.0,
    }
}

/// Run the full performance test: DNS probe, ping probe, then the external
/// throughput service. A failed speed test degrades to zero throughput with
/// the ping-probe latency.
pub async fn measure(strategy: &ProbeStrategy) -> PerformanceSample {
    info!("testing network performance");

    let dns_resolution_ms = measure_dns_resolution(strategy.dns_tool).await;
    let ping = measure_ping().await;

    let speed = run_command("speedtest-cli", &["--json"], SPEEDTEST_TIMEOUT).await;
    let (download_mbps, upload_mbps, latency_ms) = if speed.succeeded {
        match parse_speedtest_json(&speed.stdout) {
            Some(result) => (
                result.download / 1_000_000.0,
                result.upload / 1_000_000.0,
                result.ping,
            ),
            None => {
                warn!("speedtest output did not parse");
                (0.0, 0.0, ping.latency_ms)
            }
        }
    } else {
        warn!(error = %speed.stderr, "speed test failed");
        (0.0, 0.0, ping.latency_ms)
    };

    PerformanceSample {
        download_mbps,
        upload_mbps,
        latency_ms,
        jitter_ms: ping.jitter_ms,
        packet_loss_pct: ping.packet_loss_pct,
        dns_resolution_ms,
    }
}

/// Direct reachability probe: true as soon as any of the well-known URLs
/// answers with HTTP 200.
pub async fn check_connectivity() -> bool {
    let client = match reqwest::Client::builder().timeout(REACH_TIMEOUT).build() {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "cannot build HTTP client");
            return false;
        }
    };

    for url in REACHABILITY_URLS {
        match client.get(*url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => return true,
            Ok(response) => debug!(url, status = %response.status(), "reachability probe"),
            Err(err) => debug!(url, error = %err, "reachability probe failed"),
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING_OUTPUT: &str = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=12.1 ms
64 bytes from 8.8.8.8: icmp_seq=2 ttl=117 time=14.1 ms
64 bytes from 8.8.8.8: icmp_seq=3 ttl=117 time=13.1 ms

--- 8.8.8.8 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
";

    #[test]
    fn ping_stats_latency_and_jitter() {
        let stats = parse_ping_stats(PING_OUTPUT).unwrap();
        assert!((stats.latency_ms - 13.1).abs() < 1e-6);
        assert!((stats.jitter_ms - 1.5).abs() < 1e-6);
        assert_eq!(stats.packet_loss_pct, 0.0);
    }

    #[test]
    fn ping_stats_partial_loss() {
        let output = "\
64 bytes from 1.1.1.1: icmp_seq=1 ttl=58 time=9.8 ms
3 packets transmitted, 1 received, 66.6% packet loss, time 2031ms
";
        let stats = parse_ping_stats(output).unwrap();
        assert_eq!(stats.jitter_ms, 0.0);
        assert!((stats.packet_loss_pct - 66.6).abs() < 1e-6);
    }

    #[test]
    fn ping_stats_no_replies() {
        assert_eq!(parse_ping_stats("Request timeout for icmp_seq 0\n"), None);
    }

    #[test]
    fn speedtest_json_parses() {
        let json = r#"{"download": 93500000.0, "upload": 12700000.0, "ping": 18.4, "server": {"host": "x"}}"#;
        let result = parse_speedtest_json(json).unwrap();
        assert!((result.download / 1_000_000.0 - 93.5).abs() < 1e-6);
        assert!((result.upload / 1_000_000.0 - 12.7).abs() < 1e-6);
        assert_eq!(result.ping, 18.4);
    }

    #[test]
    fn speedtest_garbage_is_none() {
        assert!(parse_speedtest_json("not json").is_none());
    }
}
