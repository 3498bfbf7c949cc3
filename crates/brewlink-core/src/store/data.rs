// ── Central reactive state store ──
//
// One `SliceCell` per appliance state slice. Mutations are broadcast to
// subscribers via `watch` channels; reads are wait-free clones.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::cell::{SliceCell, Tagged};
use crate::model::{
    BrewByWeightConfig, ControllerHealth, DeviceIdentity, DiagnosticsRun, LogBufferInfo, LogEntry,
    MachineSnapshot, NetworkStatus, PairingStatus, PowerStatus, PreinfusionConfig, ScaleStatus,
    ShotSession, Statistics, Temperatures, TimeStatus,
};

/// Appliance log lines kept locally.
pub(crate) const LOG_RING_CAPACITY: usize = 200;

/// Central reactive store for all appliance state slices.
///
/// Single-writer discipline: only the frame pump and the dispatcher's
/// optimistic path write here. Everyone else subscribes.
pub struct Store {
    pub(crate) identity: SliceCell<DeviceIdentity>,
    pub(crate) machine: SliceCell<MachineSnapshot>,
    pub(crate) temperatures: SliceCell<Temperatures>,
    pub(crate) power: SliceCell<PowerStatus>,
    pub(crate) scale: SliceCell<ScaleStatus>,
    pub(crate) brew_by_weight: SliceCell<BrewByWeightConfig>,
    pub(crate) preinfusion: SliceCell<PreinfusionConfig>,
    pub(crate) shot: SliceCell<ShotSession>,
    pub(crate) statistics: SliceCell<Statistics>,
    pub(crate) diagnostics: SliceCell<DiagnosticsRun>,
    pub(crate) network: SliceCell<NetworkStatus>,
    pub(crate) controller_health: SliceCell<ControllerHealth>,
    pub(crate) pairing: SliceCell<PairingStatus>,
    pub(crate) log_info: SliceCell<LogBufferInfo>,
    pub(crate) time: SliceCell<TimeStatus>,
    pub(crate) logs: watch::Sender<Arc<Vec<LogEntry>>>,
    pub(crate) last_frame_at: watch::Sender<Option<DateTime<Utc>>>,
}

impl Store {
    pub fn new() -> Self {
        let (logs, _) = watch::channel(Arc::new(Vec::new()));
        let (last_frame_at, _) = watch::channel(None);

        Self {
            identity: SliceCell::new(),
            machine: SliceCell::new(),
            temperatures: SliceCell::new(),
            power: SliceCell::new(),
            scale: SliceCell::new(),
            brew_by_weight: SliceCell::new(),
            preinfusion: SliceCell::new(),
            shot: SliceCell::new(),
            statistics: SliceCell::new(),
            diagnostics: SliceCell::new(),
            network: SliceCell::new(),
            controller_health: SliceCell::new(),
            pairing: SliceCell::new(),
            log_info: SliceCell::new(),
            time: SliceCell::new(),
            logs,
            last_frame_at,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn identity(&self) -> DeviceIdentity {
        self.identity.get()
    }

    pub fn machine(&self) -> MachineSnapshot {
        self.machine.get()
    }

    pub fn temperatures(&self) -> Temperatures {
        self.temperatures.get()
    }

    pub fn power(&self) -> PowerStatus {
        self.power.get()
    }

    pub fn scale(&self) -> ScaleStatus {
        self.scale.get()
    }

    pub fn brew_by_weight(&self) -> BrewByWeightConfig {
        self.brew_by_weight.get()
    }

    pub fn brew_by_weight_tagged(&self) -> Tagged<BrewByWeightConfig> {
        self.brew_by_weight.get_tagged()
    }

    pub fn preinfusion(&self) -> PreinfusionConfig {
        self.preinfusion.get()
    }

    pub fn shot(&self) -> ShotSession {
        self.shot.get()
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics.get()
    }

    pub fn diagnostics(&self) -> DiagnosticsRun {
        self.diagnostics.get()
    }

    pub fn network(&self) -> NetworkStatus {
        self.network.get()
    }

    pub fn controller_health(&self) -> ControllerHealth {
        self.controller_health.get()
    }

    pub fn pairing(&self) -> PairingStatus {
        self.pairing.get()
    }

    pub fn log_info(&self) -> LogBufferInfo {
        self.log_info.get()
    }

    pub fn time(&self) -> TimeStatus {
        self.time.get()
    }

    pub fn logs(&self) -> Arc<Vec<LogEntry>> {
        self.logs.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_machine(&self) -> watch::Receiver<Tagged<MachineSnapshot>> {
        self.machine.subscribe()
    }

    pub fn subscribe_temperatures(&self) -> watch::Receiver<Tagged<Temperatures>> {
        self.temperatures.subscribe()
    }

    pub fn subscribe_scale(&self) -> watch::Receiver<Tagged<ScaleStatus>> {
        self.scale.subscribe()
    }

    pub fn subscribe_brew_by_weight(&self) -> watch::Receiver<Tagged<BrewByWeightConfig>> {
        self.brew_by_weight.subscribe()
    }

    pub fn subscribe_preinfusion(&self) -> watch::Receiver<Tagged<PreinfusionConfig>> {
        self.preinfusion.subscribe()
    }

    pub fn subscribe_shot(&self) -> watch::Receiver<Tagged<ShotSession>> {
        self.shot.subscribe()
    }

    pub fn subscribe_power(&self) -> watch::Receiver<Tagged<PowerStatus>> {
        self.power.subscribe()
    }

    pub fn subscribe_statistics(&self) -> watch::Receiver<Tagged<Statistics>> {
        self.statistics.subscribe()
    }

    pub fn subscribe_diagnostics(&self) -> watch::Receiver<Tagged<DiagnosticsRun>> {
        self.diagnostics.subscribe()
    }

    pub fn subscribe_pairing(&self) -> watch::Receiver<Tagged<PairingStatus>> {
        self.pairing.subscribe()
    }

    pub fn subscribe_logs(&self) -> watch::Receiver<Arc<Vec<LogEntry>>> {
        self.logs.subscribe()
    }

    // ── Local mutations outside the frame path ───────────────────────

    /// Append a log line, trimming the ring to capacity.
    pub(crate) fn push_log(&self, entry: LogEntry) {
        self.logs.send_modify(|ring| {
            let mut next = Vec::clone(ring);
            next.push(entry);
            if next.len() > LOG_RING_CAPACITY {
                let excess = next.len() - LOG_RING_CAPACITY;
                next.drain(..excess);
            }
            *ring = Arc::new(next);
        });
    }

    /// Clear diagnostics results and header; every other slice is
    /// untouched.
    pub fn reset_diagnostics(&self) {
        self.diagnostics.replace(DiagnosticsRun::default());
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_frame_at(&self) -> Option<DateTime<Utc>> {
        *self.last_frame_at.borrow()
    }

    /// How long ago the last frame was applied, or `None` if none yet.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_frame_at().map(|t| Utc::now() - t)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::LogLevel;

    #[test]
    fn log_ring_trims_to_capacity() {
        let store = Store::new();
        for i in 0..(LOG_RING_CAPACITY + 25) {
            store.push_log(LogEntry {
                level: LogLevel::Info,
                message: format!("line {i}"),
                ..LogEntry::default()
            });
        }
        let ring = store.logs();
        assert_eq!(ring.len(), LOG_RING_CAPACITY);
        assert_eq!(ring[0].message, "line 25");
    }

    #[test]
    fn reset_diagnostics_leaves_other_slices_alone() {
        let store = Store::new();
        store.scale.replace(ScaleStatus {
            connected: true,
            ..ScaleStatus::default()
        });
        store.diagnostics.update(|run| run.is_running = true);

        store.reset_diagnostics();

        assert_eq!(store.diagnostics(), DiagnosticsRun::default());
        assert!(store.scale().connected);
    }
}
