// Published snapshot and its display form

use serde::Serialize;

use super::{BatteryReading, ChargeLevel, ConnectionClass, NetworkReading, VolumeUsage};

/// Outcome of one source within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Ok,
    Degraded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub volumes: Health,
    pub network: Health,
    pub battery: Health,
}

impl SourceHealth {
    pub fn all_ok(&self) -> bool {
        self.volumes == Health::Ok && self.network == Health::Ok && self.battery == Health::Ok
    }
}

/// One merged telemetry sample. Never mutated after construction; shared as `Arc<Snapshot>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub cycle: u64,
    /// Unix milliseconds.
    pub sampled_at: u64,
    pub volumes: Vec<VolumeUsage>,
    pub network: NetworkReading,
    pub battery: BatteryReading,
    pub sources: SourceHealth,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDisplay {
    pub label: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
    pub used_percent_angle: f64,
    pub used_percent_string: String,
    pub total_string: String,
    pub used_string: String,
    pub free_string: String,
}

impl From<&VolumeUsage> for VolumeDisplay {
    fn from(v: &VolumeUsage) -> Self {
        Self {
            label: v.label().to_string(),
            total_bytes: v.total_bytes(),
            used_bytes: v.used_bytes(),
            free_bytes: v.free_bytes(),
            used_percent: v.used_percent(),
            used_percent_angle: v.used_percent_angle(),
            used_percent_string: v.used_percent_string(),
            total_string: v.total_string(),
            used_string: v.used_string(),
            free_string: v.free_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDisplay {
    pub connection: ConnectionClass,
    pub ssid: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryDisplay {
    pub percent_charge: u8,
    pub percent_charge_string: String,
    pub is_charging: bool,
    pub charge_level: ChargeLevel,
}

/// Snapshot with derived values resolved, for presentation (JSON over HTTP/WS).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDisplay {
    pub cycle: u64,
    pub sampled_at: u64,
    pub volumes: Vec<VolumeDisplay>,
    pub network: NetworkDisplay,
    pub battery: BatteryDisplay,
    pub sources: SourceHealth,
}

impl From<&Snapshot> for SnapshotDisplay {
    fn from(s: &Snapshot) -> Self {
        Self {
            cycle: s.cycle,
            sampled_at: s.sampled_at,
            volumes: s.volumes.iter().map(VolumeDisplay::from).collect(),
            network: NetworkDisplay {
                connection: s.network.connection(),
                ssid: s.network.ssid().to_string(),
                display_name: s.network.display_name().to_string(),
            },
            battery: BatteryDisplay {
                percent_charge: s.battery.percent_charge(),
                percent_charge_string: s.battery.percent_charge_string(),
                is_charging: s.battery.is_charging(),
                charge_level: s.battery.charge_level(),
            },
            sources: s.sources,
        }
    }
}
