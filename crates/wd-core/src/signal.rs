/// Map a signal strength in dBm to a quality percentage.
///
/// Five-bucket step function, total over all inputs.
pub fn quality_percent(signal_dbm: i32) -> u8 {
    if signal_dbm >= -50 {
        100
    } else if signal_dbm >= -60 {
        70
    } else if signal_dbm >= -70 {
        50
    } else if signal_dbm >= -80 {
        30
    } else {
        10
    }
}

/// Band label for a WiFi channel. Channels 1-14 live in 2.4 GHz; everything
/// above is treated as 5 GHz.
pub fn band_for_channel(channel: u32) -> &'static str {
    if channel <= 14 { "2.4 GHz" } else { "5 GHz" }
}

// Intentionally incomplete OUI table; enough for the vendors that matter in
// practice, not a registry lookup.
const OUI_TABLE: &[(&str, &str)] = &[
    ("00:03:93", "Apple"),
    ("00:0A:95", "Apple"),
    ("00:17:F2", "Apple"),
    ("28:CF:E9", "Apple"),
    ("A4:5E:60", "Apple"),
    ("00:1B:63", "Apple"),
    ("58:55:CA", "Apple"),
    ("00:26:08", "Apple"),
    ("3C:15:C2", "Apple"),
    ("00:50:56", "VMware"),
    ("08:00:27", "VirtualBox"),
];

/// Best-effort vendor lookup from the first three octets of a MAC address.
/// Inputs too short, or not a MAC at all, yield `None`.
pub fn vendor_for_mac(mac: &str) -> Option<&'static str> {
    let oui = mac.get(..8)?.to_uppercase();
    OUI_TABLE
        .iter()
        .find(|(prefix, _)| *prefix == oui)
        .map(|(_, vendor)| *vendor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_bucket_boundaries() {
        assert_eq!(quality_percent(-30), 100);
        assert_eq!(quality_percent(-50), 100);
        assert_eq!(quality_percent(-51), 70);
        assert_eq!(quality_percent(-60), 70);
        assert_eq!(quality_percent(-61), 50);
        assert_eq!(quality_percent(-70), 50);
        assert_eq!(quality_percent(-71), 30);
        assert_eq!(quality_percent(-80), 30);
        assert_eq!(quality_percent(-81), 10);
        assert_eq!(quality_percent(-100), 10);
    }

    #[test]
    fn quality_is_monotonic_over_the_range() {
        let mut last = 100;
        for dbm in (-100..=-30).rev() {
            let q = quality_percent(dbm);
            assert!(q <= last, "quality rose from {} to {} at {} dBm", last, q, dbm);
            assert!(matches!(q, 10 | 30 | 50 | 70 | 100));
            last = q;
        }
    }

    #[test]
    fn band_classification() {
        assert_eq!(band_for_channel(1), "2.4 GHz");
        assert_eq!(band_for_channel(14), "2.4 GHz");
        assert_eq!(band_for_channel(15), "5 GHz");
        assert_eq!(band_for_channel(36), "5 GHz");
    }

    #[test]
    fn vendor_lookup_matches_known_prefixes() {
        assert_eq!(vendor_for_mac("00:50:56:aa:bb:cc"), Some("VMware"));
        assert_eq!(vendor_for_mac("a4:5e:60:12:34:56"), Some("Apple"));
        assert_eq!(vendor_for_mac("08:00:27:00:00:01"), Some("VirtualBox"));
    }

    #[test]
    fn vendor_lookup_rejects_short_or_unknown() {
        assert_eq!(vendor_for_mac(""), None);
        assert_eq!(vendor_for_mac("00:50"), None);
        assert_eq!(vendor_for_mac("de:ad:be:ef:00:01"), None);
    }

    #[test]
    fn vendor_lookup_tolerates_non_mac_text() {
        // Scan-table columns can shift, feeding SSID fragments into the
        // address field; multi-byte text must not trip the prefix slice.
        assert_eq!(vendor_for_mac("réseau-invité"), None);
        assert_eq!(vendor_for_mac("aaaaaaa\u{e9}x"), None);
        assert_eq!(vendor_for_mac("ネットワーク名"), None);
    }
}
