// Telemetry readers: one trait per source, plus the production implementations.
// Reader calls may block on OS I/O; the aggregator always runs them on the blocking pool.

mod battery;
mod linux;
mod network;
mod volumes;

use std::sync::Arc;

use crate::error::ReaderError;
use crate::models::{BatteryReading, NetworkReading};

pub use battery::SystemBatteryReader;
pub use network::SystemNetworkReader;
pub use volumes::SysinfoVolumeReader;

/// Raw capacity numbers for one volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCapacity {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

/// One enumerated volume; reading its capacity may fail independently of the others.
#[derive(Debug)]
pub struct VolumeProbe {
    pub label: String,
    pub capacity: Result<VolumeCapacity, ReaderError>,
}

impl VolumeProbe {
    pub fn ok(label: impl Into<String>, total_bytes: u64, free_bytes: u64) -> Self {
        Self {
            label: label.into(),
            capacity: Ok(VolumeCapacity {
                total_bytes,
                free_bytes,
            }),
        }
    }

    pub fn failed(label: impl Into<String>, error: ReaderError) -> Self {
        Self {
            label: label.into(),
            capacity: Err(error),
        }
    }
}

pub trait VolumeReader: Send + Sync {
    /// Lists mounted volumes. `Err` means enumeration itself failed.
    fn list_volumes(&self) -> Result<Vec<VolumeProbe>, ReaderError>;
}

pub trait NetworkReader: Send + Sync {
    /// Current connectivity. Authorization failures must satisfy
    /// [`ReaderError::is_permission_denied`].
    fn current_network(&self) -> Result<NetworkReading, ReaderError>;

    /// Direct check for an active wired link, used when `current_network` fails.
    fn wired_link_up(&self) -> Result<bool, ReaderError>;
}

pub trait BatteryReader: Send + Sync {
    /// Charge state. Hosts without a battery return platform defaults, not an error.
    fn battery_status(&self) -> BatteryReading;
}

/// The three sources a cycle samples.
#[derive(Clone)]
pub struct Readers {
    pub volumes: Arc<dyn VolumeReader>,
    pub network: Arc<dyn NetworkReader>,
    pub battery: Arc<dyn BatteryReader>,
}

impl Readers {
    pub fn new(
        volumes: Arc<dyn VolumeReader>,
        network: Arc<dyn NetworkReader>,
        battery: Arc<dyn BatteryReader>,
    ) -> Self {
        Self {
            volumes,
            network,
            battery,
        }
    }

    /// Readers backed by the host OS.
    pub fn system() -> Self {
        Self::new(
            Arc::new(SysinfoVolumeReader::new()),
            Arc::new(SystemNetworkReader::new()),
            Arc::new(SystemBatteryReader::new()),
        )
    }
}
