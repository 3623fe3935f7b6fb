// Domain models: volumes, network, battery, snapshot

mod battery;
mod network;
mod snapshot;
mod volume;

pub use battery::{BatteryReading, ChargeLevel};
pub use network::{ConnectionClass, NetworkReading};
pub use snapshot::{
    BatteryDisplay, Health, NetworkDisplay, Snapshot, SnapshotDisplay, SourceHealth,
    VolumeDisplay,
};
pub use volume::{VolumeUsage, format_bytes};
