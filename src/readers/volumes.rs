// Volume enumeration via sysinfo

use std::sync::Mutex;

use sysinfo::Disks;
use tracing::instrument;

use super::{VolumeProbe, VolumeReader};
use crate::error::ReaderError;

pub struct SysinfoVolumeReader {
    disks: Mutex<Disks>,
}

impl Default for SysinfoVolumeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoVolumeReader {
    pub fn new() -> Self {
        Self {
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }
}

impl VolumeReader for SysinfoVolumeReader {
    #[instrument(skip(self), fields(reader = "sysinfo", operation = "list_volumes"))]
    fn list_volumes(&self) -> Result<Vec<VolumeProbe>, ReaderError> {
        let mut disks = self
            .disks
            .lock()
            .map_err(|e| ReaderError::unavailable(format!("sysinfo disks lock poisoned: {}", e)))?;
        // Re-list so media inserted or removed since the last cycle is picked up.
        disks.refresh(true);

        let probes = disks
            .list()
            .iter()
            .map(|d| {
                let label = d.mount_point().to_string_lossy().into_owned();
                let total = d.total_space();
                let free = d.available_space();
                if total == 0 {
                    let reason = if d.is_removable() {
                        "removable media not present"
                    } else {
                        "volume reports no capacity"
                    };
                    VolumeProbe::failed(label, ReaderError::not_ready(reason))
                } else if free > total {
                    VolumeProbe::failed(
                        label,
                        ReaderError::invalid_data(format!(
                            "free space {} exceeds capacity {}",
                            free, total
                        )),
                    )
                } else {
                    VolumeProbe::ok(label, total, free)
                }
            })
            .collect();
        Ok(probes)
    }
}
