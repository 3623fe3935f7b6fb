// One sampling cycle: fan out to the readers on the blocking pool, classify, merge.

use std::sync::Arc;

use super::outcome::{FailureKind, SourceFailure, SourceId, SourceOutcome};
use crate::error::ReaderError;
use crate::models::{BatteryReading, NetworkReading, Snapshot, SourceHealth, VolumeUsage};
use crate::readers::{BatteryReader, NetworkReader, Readers, VolumeReader};

pub(crate) struct Collected {
    pub volumes: SourceOutcome<Vec<VolumeUsage>>,
    pub network: SourceOutcome<NetworkReading>,
    pub battery: SourceOutcome<BatteryReading>,
}

impl Collected {
    pub fn failures(&self) -> impl Iterator<Item = &SourceFailure> {
        self.volumes
            .failures()
            .iter()
            .chain(self.network.failures())
            .chain(self.battery.failures())
    }

    /// The first network failure always comes from `current_network`; any later one
    /// is from the wired link check and never counts as an access refusal.
    pub fn network_access_denied(&self) -> bool {
        self.network
            .failures()
            .first()
            .is_some_and(|f| f.kind == FailureKind::PermissionDenied)
    }
}

/// Runs the three readers concurrently. A panic in one reader only fails that source; a
/// panicking `current_network` still falls back to the wired check.
pub(crate) async fn collect(readers: &Readers) -> Collected {
    let volumes = readers.volumes.clone();
    let network = readers.network.clone();
    let network_reader = readers.network.clone();
    let battery = readers.battery.clone();
    let (volumes, network, battery) = tokio::join!(
        guarded(SourceId::Volumes, move || sample_volumes(volumes.as_ref())),
        guarded(SourceId::Network, move || sample_network(network.as_ref())),
        guarded(SourceId::Battery, move || sample_battery(battery.as_ref())),
    );
    let network = match network {
        SourceOutcome::Failed(failure) if failure.kind == FailureKind::Panicked => {
            recover_network(network_reader, failure).await
        }
        outcome => outcome,
    };
    Collected {
        volumes,
        network,
        battery,
    }
}

/// Wired link check after `current_network` panicked.
async fn recover_network(
    reader: Arc<dyn NetworkReader>,
    failure: SourceFailure,
) -> SourceOutcome<NetworkReading> {
    let mut failures = vec![failure];
    let value = match tokio::task::spawn_blocking(move || wired_fallback(reader.as_ref())).await {
        Ok((value, check_failure)) => {
            failures.extend(check_failure);
            value
        }
        Err(e) => {
            failures.push(
                SourceFailure::panicked(SourceId::Network, e).with_context("wired link check"),
            );
            NetworkReading::none()
        }
    };
    SourceOutcome::Degraded { value, failures }
}

async fn guarded<T, F>(source: SourceId, sample: F) -> SourceOutcome<T>
where
    F: FnOnce() -> SourceOutcome<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(sample).await {
        Ok(outcome) => outcome,
        Err(e) => SourceOutcome::Failed(SourceFailure::panicked(source, e)),
    }
}

pub(crate) fn sample_volumes(reader: &dyn VolumeReader) -> SourceOutcome<Vec<VolumeUsage>> {
    let probes = match reader.list_volumes() {
        Ok(p) => p,
        Err(e) => return SourceOutcome::Failed(SourceFailure::from_reader_error(SourceId::Volumes, &e)),
    };

    let mut failures = Vec::new();
    let volumes = probes
        .into_iter()
        .map(|probe| {
            let measured = probe.capacity.and_then(|c| {
                VolumeUsage::measured(probe.label.as_str(), c.total_bytes, c.free_bytes).ok_or_else(
                    || {
                        ReaderError::invalid_data(format!(
                            "free space {} exceeds capacity {}",
                            c.free_bytes, c.total_bytes
                        ))
                    },
                )
            });
            match measured {
                Ok(volume) => volume,
                Err(e) => {
                    failures.push(
                        SourceFailure::from_reader_error(SourceId::Volumes, &e)
                            .with_context(&probe.label),
                    );
                    VolumeUsage::degraded(&probe.label, &e.reason())
                }
            }
        })
        .collect();

    if failures.is_empty() {
        SourceOutcome::Success(volumes)
    } else {
        SourceOutcome::Degraded {
            value: volumes,
            failures,
        }
    }
}

/// On any failure, falls back to the wired link check; `None` when that is down or fails too.
pub(crate) fn sample_network(reader: &dyn NetworkReader) -> SourceOutcome<NetworkReading> {
    let error = match reader.current_network() {
        Ok(reading) => return SourceOutcome::Success(reading),
        Err(e) => e,
    };

    let mut failures = vec![SourceFailure::from_reader_error(SourceId::Network, &error)];
    let (value, check_failure) = wired_fallback(reader);
    failures.extend(check_failure);
    SourceOutcome::Degraded { value, failures }
}

/// A failed wired check counts as "not up".
fn wired_fallback(reader: &dyn NetworkReader) -> (NetworkReading, Option<SourceFailure>) {
    match reader.wired_link_up() {
        Ok(true) => (NetworkReading::wired(), None),
        Ok(false) => (NetworkReading::none(), None),
        Err(e) => (
            NetworkReading::none(),
            Some(
                SourceFailure::from_reader_error(SourceId::Network, &e)
                    .with_context("wired link check"),
            ),
        ),
    }
}

pub(crate) fn sample_battery(reader: &dyn BatteryReader) -> SourceOutcome<BatteryReading> {
    SourceOutcome::Success(reader.battery_status())
}

pub(crate) fn merge(cycle: u64, sampled_at: u64, collected: Collected) -> Snapshot {
    let sources = SourceHealth {
        volumes: collected.volumes.health(),
        network: collected.network.health(),
        battery: collected.battery.health(),
    };
    Snapshot {
        cycle,
        sampled_at,
        volumes: collected.volumes.into_value_or_else(Vec::new),
        network: collected.network.into_value_or_else(NetworkReading::none),
        battery: collected
            .battery
            .into_value_or_else(BatteryReading::default),
        sources,
    }
}
