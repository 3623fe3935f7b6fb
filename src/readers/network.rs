// Network connectivity: wireless association + signal, wired link fallback

use std::net::IpAddr;
use std::sync::Mutex;

use sysinfo::Networks;
use tracing::instrument;

use super::{NetworkReader, linux};
use crate::error::ReaderError;
use crate::models::NetworkReading;

pub struct SystemNetworkReader {
    networks: Mutex<Networks>,
}

impl Default for SystemNetworkReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemNetworkReader {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }
}

impl NetworkReader for SystemNetworkReader {
    #[instrument(skip(self), fields(reader = "network", operation = "current_network"))]
    fn current_network(&self) -> Result<NetworkReading, ReaderError> {
        let interfaces = linux::wireless_interfaces()?;
        if !interfaces.is_empty() {
            let quality_table = match linux::read_proc_net_wireless() {
                Ok(content) => Some(content),
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    return Err(ReaderError::permission_denied(format!(
                        "/proc/net/wireless: {}",
                        e
                    )));
                }
                Err(_) => None,
            };

            for iface in &interfaces {
                let link = match linux::iw_link(iface) {
                    Ok(link) => link,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        tracing::debug!(interface = %iface, "iw not installed; skipping association check");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                let Some(ssid) = link.ssid else {
                    continue;
                };
                let quality = quality_table
                    .as_deref()
                    .and_then(|t| linux::parse_wireless_quality(t, iface))
                    .or_else(|| link.signal_dbm.map(linux::dbm_to_quality));
                tracing::debug!(interface = %iface, ssid = %ssid, ?quality, "wireless association");
                return Ok(match quality {
                    Some(q) => NetworkReading::wireless(ssid, q),
                    None => NetworkReading::wireless_unmeasured(ssid),
                });
            }
        }

        if self.wired_link_up()? {
            Ok(NetworkReading::wired())
        } else {
            Ok(NetworkReading::none())
        }
    }

    #[instrument(skip(self), fields(reader = "network", operation = "wired_link_up"))]
    fn wired_link_up(&self) -> Result<bool, ReaderError> {
        let mut networks = self
            .networks
            .lock()
            .map_err(|e| ReaderError::unavailable(format!("sysinfo networks lock poisoned: {}", e)))?;
        networks.refresh(true);
        let up = networks.list().iter().any(|(name, data)| {
            !linux::is_wireless(name)
                && linux::is_physical(name)
                && linux::operstate(name).is_none_or(|s| s == "up")
                && data.ip_networks().iter().any(|n| match n.addr {
                    IpAddr::V4(v4) => !v4.is_loopback() && !v4.is_link_local(),
                    IpAddr::V6(_) => false,
                })
        });
        Ok(up)
    }
}
