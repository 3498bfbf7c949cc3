// ── Demo data provider ──
//
// With no appliance reachable (or `demo_mode` set), the store is seeded
// with synthetic slices and fed by a local task so consumers exercise
// the exact same read surface as a live connection. Commands are
// accepted and echoed optimistically but nothing leaves the process.

use std::sync::Arc;
use std::time::Duration;

use brewlink_api::OutboundCommand;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::dispatch::CommandSink;
use crate::model::{
    BrewByWeightConfig, ControllerHealth, DeviceIdentity, LogBufferInfo, MachineMode,
    MachineSnapshot, MachineState, MachineType, NetworkStatus, PairingStatus, PowerStatus,
    PreinfusionConfig, ScaleStatus, Statistics, Temperatures, TimeStatus,
};
use crate::store::Store;

const FEED_PERIOD: Duration = Duration::from_secs(1);

// ── Synthetic slices ─────────────────────────────────────────────────

pub fn identity() -> DeviceIdentity {
    DeviceIdentity {
        device_id: "demo-0001".into(),
        device_name: "Demo Machine".into(),
        machine_brand: "BrewOS".into(),
        machine_model: "Duetto Demo".into(),
        machine_type: MachineType::DualBoiler,
        firmware_version: Some("2.4.0-demo".into()),
    }
}

pub fn machine() -> MachineSnapshot {
    MachineSnapshot {
        state: MachineState::Ready,
        mode: MachineMode::On,
        is_heating: false,
        is_brewing: false,
        water_low: false,
        machine_on_timestamp: Some(1_748_760_000_000),
        last_shot_timestamp: Some(1_748_762_400_000),
    }
}

pub fn temperatures() -> Temperatures {
    Temperatures {
        brew_current: 93.2,
        brew_setpoint: 93.5,
        steam_current: 123.8,
        steam_setpoint: 124.0,
        group: 88.4,
    }
}

pub fn scale() -> ScaleStatus {
    ScaleStatus {
        connected: true,
        name: "Demo Lunar".into(),
        kind: "acaia".into(),
        weight: 0.0,
        flow_rate: 0.0,
        stable: true,
        battery: 82,
    }
}

pub fn brew_by_weight() -> BrewByWeightConfig {
    BrewByWeightConfig {
        enabled: true,
        dose_weight: 18.0,
        target_weight: 36.0,
        stop_offset: 2.0,
        auto_tare: true,
    }
}

pub fn preinfusion() -> PreinfusionConfig {
    PreinfusionConfig {
        enabled: true,
        on_time_ms: 3000,
        pause_time_ms: 5000,
    }
}

pub fn power() -> PowerStatus {
    PowerStatus {
        watts: 48.0,
        voltage: 231.0,
        today_kwh: 0.9,
        total_kwh: 412.6,
        meter_connected: true,
    }
}

pub fn statistics() -> Statistics {
    Statistics {
        total_shots: 1287,
        total_kwh: 412.6,
        avg_brew_time_ms: 28_400,
        min_brew_time_ms: 21_000,
        max_brew_time_ms: 41_200,
        shots_today: 4,
        weekly_count: 21,
        monthly_count: 88,
        kwh_today: 0.9,
        shots_since_descale: 113,
        shots_since_backflush: 9,
        shots_since_group_clean: 3,
        weekly_breakdown: Some(vec![2, 3, 4, 4, 3, 2, 3]),
    }
}

pub fn network() -> NetworkStatus {
    NetworkStatus {
        connected: true,
        ap_mode: false,
        ssid: "DemoNet".into(),
        rssi: -54,
        ip: "192.168.1.42".into(),
    }
}

pub fn controller_health() -> ControllerHealth {
    ControllerHealth {
        pico_connected: true,
        pico_version: "1.9.2".into(),
        cloud_connected: true,
        mqtt_connected: false,
    }
}

pub fn pairing() -> PairingStatus {
    PairingStatus {
        paired: true,
        pairing_code: None,
        cloud_url: Some("https://cloud.brewos.example".into()),
    }
}

pub fn log_info() -> LogBufferInfo {
    LogBufferInfo {
        enabled: true,
        size_bytes: 32_768,
        entry_count: 154,
    }
}

pub fn time_status() -> TimeStatus {
    TimeStatus {
        synced: true,
        ntp_enabled: true,
        current_time: Some(Utc::now()),
        utc_offset_minutes: 120,
    }
}

/// Seed every slice with demo data in one pass.
pub fn seed(store: &Store) {
    store.identity.replace(identity());
    store.machine.replace(machine());
    store.temperatures.replace(temperatures());
    store.scale.replace(scale());
    store.brew_by_weight.replace(brew_by_weight());
    store.preinfusion.replace(preinfusion());
    store.power.replace(power());
    store.statistics.replace(statistics());
    store.network.replace(network());
    store.controller_health.replace(controller_health());
    store.pairing.replace(pairing());
    store.log_info.replace(log_info());
    store.time.replace(time_status());
}

// ── Command sink ─────────────────────────────────────────────────────

/// Sink that accepts every command without a wire.
///
/// Dispatch still applies its optimistic echo, so demo-mode writes are
/// visible through the store exactly like live ones — they just never
/// get an authoritative confirmation.
#[derive(Debug, Default)]
pub struct DemoSink;

impl CommandSink for DemoSink {
    fn is_connected(&self) -> bool {
        true
    }

    fn send(&self, command: &OutboundCommand) -> Result<(), brewlink_api::Error> {
        debug!(cmd = %command.name, "demo sink swallowed command");
        Ok(())
    }
}

// ── Feed task ────────────────────────────────────────────────────────

/// Gentle once-a-second drift on the live-telemetry slices so the demo
/// does not look frozen.
pub(crate) async fn feed(store: Arc<Store>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(FEED_PERIOD);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tick = tick.wrapping_add(1);
                #[allow(clippy::cast_precision_loss)]
                let phase = (tick as f64) / 7.0;

                store.temperatures.update(|t| {
                    t.brew_current = 93.2 + 0.3 * phase.sin();
                    t.steam_current = 123.8 + 0.4 * (phase * 0.6).cos();
                });
                store.power.update(|p| {
                    p.watts = 48.0 + 14.0 * (phase * 0.5).sin().abs();
                });
            }
        }
    }
    debug!("demo feed stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::rules;

    /// Every demo slice must survive a serialize/deserialize round trip
    /// unchanged — the synthetic shapes are the live wire shapes.
    macro_rules! assert_round_trip {
        ($value:expr) => {{
            let value = $value;
            let json = serde_json::to_string(&value).unwrap();
            let back = serde_json::from_str(&json).unwrap();
            assert_eq!(value, back);
        }};
    }

    #[test]
    fn demo_slices_round_trip_like_live_shapes() {
        assert_round_trip!(identity());
        assert_round_trip!(machine());
        assert_round_trip!(temperatures());
        assert_round_trip!(scale());
        assert_round_trip!(brew_by_weight());
        assert_round_trip!(preinfusion());
        assert_round_trip!(power());
        assert_round_trip!(statistics());
        assert_round_trip!(network());
        assert_round_trip!(controller_health());
        assert_round_trip!(pairing());
        assert_round_trip!(log_info());
        assert_round_trip!(time_status());
    }

    #[test]
    fn seeded_store_satisfies_cross_slice_rules() {
        let store = Store::new();
        seed(&store);

        // Brew-by-weight is enabled, so the demo scale must be
        // connected or the seed violates its own invariant.
        assert!(rules::bbw_requires_scale(&store).is_none());
        assert_eq!(store.statistics().weekly_breakdown.unwrap().len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn feed_drifts_telemetry_until_cancelled() {
        let store = Arc::new(Store::new());
        seed(&store);
        let before = store.temperatures();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(feed(Arc::clone(&store), cancel.clone()));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_ne!(store.temperatures(), before);

        cancel.cancel();
        task.await.unwrap();
    }
}
