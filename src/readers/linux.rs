// Linux-specific helpers: /sys/class/net, /proc/net/wireless, `iw`.

use std::io;

/// Max link quality reported by most drivers in /proc/net/wireless.
const PROC_WIRELESS_MAX_QUALITY: f64 = 70.0;

/// Association state reported by `iw dev <iface> link`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct IwLink {
    pub ssid: Option<String>,
    pub signal_dbm: Option<i32>,
}

/// Interfaces with a wireless extension (`/sys/class/net/<if>/wireless` or `phy80211`).
pub(super) fn wireless_interfaces() -> io::Result<Vec<String>> {
    #[cfg(target_os = "linux")]
    {
        let mut names = Vec::new();
        for entry in std::fs::read_dir("/sys/class/net")? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_wireless(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
    #[cfg(not(target_os = "linux"))]
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "wireless inspection is only implemented for Linux",
    ))
}

pub(super) fn is_wireless(interface_name: &str) -> bool {
    #[cfg(target_os = "linux")]
    {
        let base = std::path::Path::new("/sys/class/net").join(interface_name);
        base.join("wireless").exists() || base.join("phy80211").exists()
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        false
    }
}

/// Backed by a device (excludes loopback, bridges, veth and other virtual links).
pub(super) fn is_physical(interface_name: &str) -> bool {
    #[cfg(target_os = "linux")]
    {
        std::path::Path::new("/sys/class/net")
            .join(interface_name)
            .join("device")
            .exists()
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        true
    }
}

/// Operational state from /sys/class/net/<if>/operstate ("up", "down", ...).
pub(super) fn operstate(interface_name: &str) -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/operstate", interface_name);
        let v = std::fs::read_to_string(path).ok()?;
        let v = v.trim();
        if v.is_empty() {
            return None;
        }
        Some(v.to_ascii_lowercase())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        None
    }
}

pub(super) fn read_proc_net_wireless() -> io::Result<String> {
    std::fs::read_to_string("/proc/net/wireless")
}

/// Runs `iw dev <iface> link`. A refusal from the kernel is mapped to `PermissionDenied`.
pub(super) fn iw_link(interface_name: &str) -> io::Result<IwLink> {
    let output = std::process::Command::new("iw")
        .args(["dev", interface_name, "link"])
        .output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let kind = if stderr.contains("Operation not permitted")
            || stderr.contains("Permission denied")
        {
            io::ErrorKind::PermissionDenied
        } else {
            io::ErrorKind::Other
        };
        return Err(io::Error::new(
            kind,
            format!("iw dev {} link: {}", interface_name, stderr.trim()),
        ));
    }
    Ok(parse_iw_link(&String::from_utf8_lossy(&output.stdout)))
}

pub(super) fn parse_iw_link(stdout: &str) -> IwLink {
    let mut link = IwLink::default();
    for line in stdout.lines() {
        let line = line.trim();
        if line.starts_with("Not connected") {
            return IwLink::default();
        } else if let Some(ssid) = line.strip_prefix("SSID:") {
            let ssid = ssid.trim();
            if !ssid.is_empty() {
                link.ssid = Some(ssid.to_string());
            }
        } else if let Some(signal) = line.strip_prefix("signal:") {
            link.signal_dbm = signal
                .split_whitespace()
                .next()
                .and_then(|dbm| dbm.parse().ok());
        }
    }
    link
}

/// Link quality for `interface_name` from /proc/net/wireless, scaled to 0-100.
pub(super) fn parse_wireless_quality(content: &str, interface_name: &str) -> Option<u8> {
    // Two header lines, then "  wlan0: 0000   54.  -56.  -256 ..."
    for line in content.lines().skip(2) {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        if name.trim() != interface_name {
            continue;
        }
        let link = rest.split_whitespace().nth(1)?.trim_end_matches('.');
        let link: f64 = link.parse().ok()?;
        let scaled = (link / PROC_WIRELESS_MAX_QUALITY * 100.0).round();
        return Some(scaled.clamp(0.0, 100.0) as u8);
    }
    None
}

/// RSSI to quality: -100 dBm or weaker is 0, -50 dBm or stronger is 100.
pub(super) fn dbm_to_quality(dbm: i32) -> u8 {
    (2 * (dbm + 100)).clamp(0, 100) as u8
}
