use crate::runner::tool_available;
use anyhow::{Result, bail};

/// Supported host platforms. Anything else is a fatal startup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
}

/// How interfaces are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceSource {
    /// networksetup / ifconfig / scutil
    MacOs,
    /// nmcli (NetworkManager)
    NetworkManager,
    /// /sys/class/net + ip + iwconfig
    Legacy,
}

/// How WiFi scans are performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    Airport,
    NetworkManager,
    Iwlist,
}

/// Which tool backs the DNS latency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsProbeTool {
    Dig,
    Nslookup,
}

/// Concrete acquisition strategy, probed once at startup and fixed for the
/// rest of the process. On Linux the NetworkManager path is preferred when
/// nmcli is present, otherwise the legacy tool path is used.
#[derive(Debug, Clone, Copy)]
pub struct ProbeStrategy {
    pub platform: Platform,
    pub interface_source: InterfaceSource,
    pub scan_source: ScanSource,
    pub dns_tool: DnsProbeTool,
}

impl ProbeStrategy {
    pub async fn detect() -> Result<Self> {
        match std::env::consts::OS {
            "macos" => Ok(Self {
                platform: Platform::MacOs,
                interface_source: InterfaceSource::MacOs,
                scan_source: ScanSource::Airport,
                dns_tool: DnsProbeTool::Dig,
            }),
            "linux" => {
                let nmcli = tool_available("nmcli").await;
                Ok(Self {
                    platform: Platform::Linux,
                    interface_source: if nmcli {
                        InterfaceSource::NetworkManager
                    } else {
                        InterfaceSource::Legacy
                    },
                    scan_source: if nmcli {
                        ScanSource::NetworkManager
                    } else {
                        ScanSource::Iwlist
                    },
                    dns_tool: DnsProbeTool::Nslookup,
                })
            }
            other => bail!("unsupported platform '{}': wifidoc runs on macOS and Linux only", other),
        }
    }

    pub fn system_label(&self) -> &'static str {
        match self.platform {
            Platform::MacOs => "Darwin",
            Platform::Linux => "Linux",
        }
    }

    pub fn is_macos(&self) -> bool {
        self.platform == Platform::MacOs
    }

    pub fn is_linux(&self) -> bool {
        self.platform == Platform::Linux
    }
}
