// Shared test helpers: stub readers, recording sink, aggregator builder

#![allow(dead_code)]

use homestatus::aggregator::{
    AggregatorConfig, NotificationSink, Notifier, PermissionNotice, TelemetryAggregator,
};
use homestatus::error::ReaderError;
use homestatus::models::{BatteryReading, NetworkReading, Snapshot};
use homestatus::readers::{BatteryReader, NetworkReader, Readers, VolumeProbe, VolumeReader};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// Tracks how many reader calls overlap.
#[derive(Default)]
pub struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub enum VolumeBehavior {
    /// (label, total, free) per volume; `None` capacity makes that volume fail.
    Volumes(Vec<(&'static str, Option<(u64, u64)>)>),
    /// One volume whose total/free equal the call number, so snapshots can be matched to cycles.
    CountedVolume,
    EnumerationFails,
    Panics,
}

pub struct StubVolumes {
    pub behavior: VolumeBehavior,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub probe: Arc<ConcurrencyProbe>,
}

impl StubVolumes {
    pub fn new(behavior: VolumeBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            probe: Arc::new(ConcurrencyProbe::default()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VolumeReader for StubVolumes {
    fn list_volumes(&self) -> Result<Vec<VolumeProbe>, ReaderError> {
        self.probe.enter();
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.probe.exit();
        match &self.behavior {
            VolumeBehavior::Volumes(list) => Ok(list
                .iter()
                .map(|(label, cap)| match cap {
                    Some((total, free)) => VolumeProbe::ok(*label, *total, *free),
                    None => VolumeProbe::failed(
                        *label,
                        ReaderError::not_ready("The device is not ready"),
                    ),
                })
                .collect()),
            VolumeBehavior::CountedVolume => Ok(vec![VolumeProbe::ok("/", call, call)]),
            VolumeBehavior::EnumerationFails => {
                Err(ReaderError::unavailable("cannot enumerate volumes"))
            }
            VolumeBehavior::Panics => panic!("volume driver exploded"),
        }
    }
}

pub enum NetworkBehavior {
    Reading(NetworkReading),
    PermissionDenied,
    OtherFailure,
    Panics,
}

pub struct StubNetwork {
    pub behavior: NetworkBehavior,
    pub wired_up: AtomicBool,
    pub wired_fails: bool,
    pub wired_denied: bool,
    pub calls: AtomicUsize,
}

impl StubNetwork {
    pub fn new(behavior: NetworkBehavior) -> Self {
        Self {
            behavior,
            wired_up: AtomicBool::new(false),
            wired_fails: false,
            wired_denied: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_wired(self, up: bool) -> Self {
        self.wired_up.store(up, Ordering::SeqCst);
        self
    }

    pub fn with_failing_wired_check(mut self) -> Self {
        self.wired_fails = true;
        self
    }

    pub fn with_denied_wired_check(mut self) -> Self {
        self.wired_denied = true;
        self
    }
}

impl NetworkReader for StubNetwork {
    fn current_network(&self) -> Result<NetworkReading, ReaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            NetworkBehavior::Reading(r) => Ok(r.clone()),
            NetworkBehavior::PermissionDenied => Err(ReaderError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "location access disabled",
            ))),
            NetworkBehavior::OtherFailure => Err(ReaderError::unavailable("wlan service stopped")),
            NetworkBehavior::Panics => panic!("wlan driver exploded"),
        }
    }

    fn wired_link_up(&self) -> Result<bool, ReaderError> {
        if self.wired_fails {
            return Err(ReaderError::unavailable("no interface table"));
        }
        if self.wired_denied {
            return Err(ReaderError::permission_denied("interface table is restricted"));
        }
        Ok(self.wired_up.load(Ordering::SeqCst))
    }
}

pub enum BatteryBehavior {
    Fixed(BatteryReading),
    /// Percent equals the call number.
    Counted,
    Panics,
}

pub struct StubBattery {
    pub behavior: BatteryBehavior,
    pub calls: AtomicUsize,
}

impl StubBattery {
    pub fn new(behavior: BatteryBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }
}

impl BatteryReader for StubBattery {
    fn battery_status(&self) -> BatteryReading {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        match &self.behavior {
            BatteryBehavior::Fixed(r) => *r,
            BatteryBehavior::Counted => BatteryReading::new(call, false),
            BatteryBehavior::Panics => panic!("battery driver exploded"),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub notices: Mutex<Vec<PermissionNotice>>,
    /// When set, the next delivery panics instead of recording.
    pub panic_next: AtomicBool,
}

impl RecordingSink {
    pub fn panicking_once() -> Self {
        Self {
            panic_next: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn on_permission_denied(&self, notice: &PermissionNotice) {
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("notification sink failed");
        }
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn healthy_volumes() -> StubVolumes {
    StubVolumes::new(VolumeBehavior::Volumes(vec![
        ("C:\\", Some((500, 200))),
        ("D:\\", Some((1000, 1000))),
    ]))
}

pub fn healthy_network() -> StubNetwork {
    StubNetwork::new(NetworkBehavior::Reading(NetworkReading::wireless(
        "HomeNet", 72,
    )))
}

pub fn healthy_battery() -> StubBattery {
    StubBattery::new(BatteryBehavior::Fixed(BatteryReading::new(64, true)))
}

pub fn aggregator_with(
    volumes: Arc<StubVolumes>,
    network: Arc<StubNetwork>,
    battery: Arc<StubBattery>,
    sink: Arc<RecordingSink>,
) -> TelemetryAggregator {
    TelemetryAggregator::new(
        Readers::new(volumes, network, battery),
        Arc::new(Notifier::new(sink)),
        AggregatorConfig {
            stats_log_interval: Duration::from_secs(3600),
            broadcast_capacity: 64,
        },
    )
}

/// Waits for the next published snapshot, failing the test after `limit`.
pub async fn next_snapshot(
    rx: &mut broadcast::Receiver<Arc<Snapshot>>,
    limit: Duration,
) -> Arc<Snapshot> {
    tokio::time::timeout(limit, rx.recv())
        .await
        .expect("timed out waiting for snapshot")
        .expect("snapshot channel closed")
}
