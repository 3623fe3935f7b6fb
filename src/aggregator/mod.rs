// Telemetry aggregator: owns the sampling schedule and the current snapshot.
// Timer ticks and manual triggers both go through one cycle gate, so cycles never overlap.

mod cycle;
mod notify;
mod outcome;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tokio::sync::{broadcast, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tracing::{debug, error, info, instrument, warn};

use crate::models::Snapshot;
use crate::readers::Readers;

pub use notify::{
    NETWORK_ACCESS_NOTICE_ID, NoticeLog, NotificationSink, Notifier, PermissionNotice,
};
pub use outcome::{FailureKind, SourceFailure, SourceId, SourceOutcome};

/// `tokio::time::interval` rejects a zero period.
const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// How often the schedule logs cycle/failure counters at INFO.
    pub stats_log_interval: Duration,
    /// Snapshots buffered per subscriber before it lags.
    pub broadcast_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            stats_log_interval: Duration::from_secs(60),
            broadcast_capacity: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorStats {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    /// Cycles in which the source reported at least one failure.
    pub volume_failures: u64,
    pub network_failures: u64,
    pub battery_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleTrigger {
    Timer,
    Manual,
}

#[derive(Default)]
struct Counters {
    cycles_completed: AtomicU64,
    cycles_failed: AtomicU64,
    volume_failures: AtomicU64,
    network_failures: AtomicU64,
    battery_failures: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> AggregatorStats {
        AggregatorStats {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            volume_failures: self.volume_failures.load(Ordering::Relaxed),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            battery_failures: self.battery_failures.load(Ordering::Relaxed),
        }
    }

    fn record_source_failure(&self, source: SourceId) {
        let counter = match source {
            SourceId::Volumes => &self.volume_failures,
            SourceId::Network => &self.network_failures,
            SourceId::Battery => &self.battery_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct Shared {
    readers: Readers,
    notifier: Arc<Notifier>,
    latest: RwLock<Option<Arc<Snapshot>>>,
    tx: broadcast::Sender<Arc<Snapshot>>,
    /// Held for the whole of every cycle; guards the last published cycle number.
    cycle_gate: tokio::sync::Mutex<u64>,
    /// Set while a manual cycle is waiting for the gate; further triggers coalesce into it.
    manual_queued: AtomicBool,
    counters: Counters,
    stats_log_interval: Duration,
}

struct Schedule {
    shutdown_tx: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

pub struct TelemetryAggregator {
    shared: Arc<Shared>,
    schedule: Mutex<Option<Schedule>>,
}

impl TelemetryAggregator {
    pub fn new(readers: Readers, notifier: Arc<Notifier>, config: AggregatorConfig) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                readers,
                notifier,
                latest: RwLock::new(None),
                tx,
                cycle_gate: tokio::sync::Mutex::new(0),
                manual_queued: AtomicBool::new(false),
                counters: Counters::default(),
                stats_log_interval: config.stats_log_interval.max(MIN_SAMPLE_INTERVAL),
            }),
            schedule: Mutex::new(None),
        }
    }

    /// Starts periodic sampling; the first cycle runs immediately. No-op when already running.
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, sample_interval: Duration) {
        let mut schedule = self.schedule.lock().unwrap_or_else(PoisonError::into_inner);
        if schedule.as_ref().is_some_and(|s| !s.handle.is_finished()) {
            debug!("telemetry aggregator already running");
            return;
        }
        let sample_interval = if sample_interval < MIN_SAMPLE_INTERVAL {
            warn!(
                requested_ms = sample_interval.as_millis() as u64,
                "sample interval too small; clamping to 1ms"
            );
            MIN_SAMPLE_INTERVAL
        } else {
            sample_interval
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_schedule(
            self.shared.clone(),
            sample_interval,
            shutdown_rx,
        ));
        *schedule = Some(Schedule {
            shutdown_tx,
            handle,
        });
        info!(
            sample_interval_ms = sample_interval.as_millis() as u64,
            "telemetry aggregator started"
        );
    }

    /// Stops future timer cycles without waiting. An in-flight cycle still completes and
    /// publishes. Idempotent.
    pub fn stop(&self) {
        if let Some(schedule) = self.take_schedule() {
            let _ = schedule.shutdown_tx.send(());
            info!("telemetry aggregator stopped");
        }
    }

    /// Like [`stop`](Self::stop), then waits for the schedule task (and any cycle it is
    /// running) to finish.
    pub async fn shutdown(&self) {
        if let Some(schedule) = self.take_schedule() {
            let _ = schedule.shutdown_tx.send(());
            if let Err(e) = schedule.handle.await {
                warn!(error = %e, "schedule task ended abnormally");
            }
            info!("telemetry aggregator shut down");
        }
    }

    pub fn is_running(&self) -> bool {
        self.schedule
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    /// Requests an out-of-band cycle, running or not. Triggers coalesce: while a manual
    /// cycle is queued behind the gate, further triggers are folded into it, so a burst
    /// during an in-flight cycle yields exactly one follow-up cycle.
    /// Must be called from within a Tokio runtime.
    pub fn trigger_now(&self) {
        if self.shared.manual_queued.swap(true, Ordering::AcqRel) {
            debug!("manual refresh already queued; coalescing");
            return;
        }
        let shared = self.shared.clone();
        tokio::spawn(async move {
            shared.run_cycle(CycleTrigger::Manual).await;
        });
    }

    /// Last published snapshot, or `None` before the first cycle completes. Never waits on a cycle.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.shared
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receives every snapshot published after subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.shared.tx.subscribe()
    }

    pub fn stats(&self) -> AggregatorStats {
        self.shared.counters.snapshot()
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.shared.notifier
    }

    fn take_schedule(&self) -> Option<Schedule> {
        self.schedule
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Shared {
    /// Runs one cycle under the gate. Any error or panic is logged and counted; the caller
    /// (schedule loop or manual trigger) carries on.
    async fn run_cycle(self: &Arc<Self>, trigger: CycleTrigger) {
        let mut last_cycle = self.cycle_gate.lock().await;
        if trigger == CycleTrigger::Manual {
            self.manual_queued.store(false, Ordering::Release);
        }
        let cycle = *last_cycle + 1;

        let shared = Arc::clone(self);
        match tokio::spawn(async move { shared.sample(cycle).await }).await {
            Ok(Ok(snapshot)) => {
                *last_cycle = cycle;
                self.publish(snapshot);
                debug!(cycle, ?trigger, "snapshot published");
            }
            Ok(Err(e)) => {
                self.counters.cycles_failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, cycle, ?trigger, "telemetry cycle failed");
            }
            Err(e) => {
                self.counters.cycles_failed.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, cycle, ?trigger, "telemetry cycle panicked");
            }
        }
    }

    async fn sample(&self, cycle: u64) -> anyhow::Result<Arc<Snapshot>> {
        let sampled_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_millis() as u64;

        let collected = cycle::collect(&self.readers).await;
        self.report_failures(cycle, &collected);
        Ok(Arc::new(cycle::merge(cycle, sampled_at, collected)))
    }

    fn report_failures(&self, cycle: u64, collected: &cycle::Collected) {
        let mut failed_sources: Vec<SourceId> = Vec::new();
        for failure in collected.failures() {
            warn!(
                cycle,
                source = %failure.source,
                operation = failure.source.operation(),
                kind = ?failure.kind,
                error = %failure.message,
                "telemetry source failed"
            );
            if !failed_sources.contains(&failure.source) {
                failed_sources.push(failure.source);
            }
        }
        for source in failed_sources {
            self.counters.record_source_failure(source);
        }
        if collected.network_access_denied() {
            self.notifier.raise(PermissionNotice::network_access());
        }
    }

    /// Single visibility change of a cycle: swap the `Arc`, then broadcast.
    fn publish(&self, snapshot: Arc<Snapshot>) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        self.counters
            .cycles_completed
            .fetch_add(1, Ordering::Relaxed);
        if self.tx.send(snapshot).is_err() {
            tracing::trace!(operation = "broadcast_snapshot", "no snapshot subscribers");
        }
    }
}

#[instrument(skip(shared, shutdown_rx), fields(sample_interval_ms = sample_interval.as_millis() as u64))]
async fn run_schedule(
    shared: Arc<Shared>,
    sample_interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut tick = interval(sample_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats_log_tick = interval_at(
        Instant::now() + shared.stats_log_interval,
        shared.stats_log_interval,
    );
    stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => {
                debug!("schedule shutting down");
                break;
            }
            _ = tick.tick() => {
                shared.run_cycle(CycleTrigger::Timer).await;
            }
            _ = stats_log_tick.tick() => {
                let stats = shared.counters.snapshot();
                info!(
                    cycles_completed = stats.cycles_completed,
                    cycles_failed = stats.cycles_failed,
                    volume_failures = stats.volume_failures,
                    network_failures = stats.network_failures,
                    battery_failures = stats.battery_failures,
                    subscribers = shared.tx.receiver_count(),
                    "aggregator stats"
                );
            }
        }
    }
}
