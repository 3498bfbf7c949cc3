// ── Command dispatch ──
//
// All write operations flow through a unified `Command` enum. Dispatch
// is fire-and-forget: a command is serialized and handed to the
// transport, and its effect is confirmed only by a later telemetry push.
// There is no retry and no synchronous appliance reply.

use std::sync::Arc;

use brewlink_api::OutboundCommand;
use serde_json::{Value, json};
use strum::Display;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::model::{BrewByWeightConfig, MachineMode, MachineType, PreinfusionConfig};
use crate::store::Store;

// ── Command catalog ──────────────────────────────────────────────────

/// Maintenance actions whose counters the appliance tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MaintenanceKind {
    Descale,
    Backflush,
    GroupClean,
}

/// All write operations against the appliance.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Brewing ──────────────────────────────────────────────────────
    SetBrewByWeight(BrewByWeightConfig),
    SetPreinfusion(PreinfusionConfig),
    StartBrew,
    StopBrew,

    // ── Scale ────────────────────────────────────────────────────────
    Tare,
    ScaleReset,

    // ── Machine configuration ────────────────────────────────────────
    SetMachineInfo {
        device_name: String,
        machine_brand: String,
        machine_model: String,
        machine_type: MachineType,
    },
    SetPowerConfig {
        meter_enabled: bool,
    },
    SetEco {
        enabled: bool,
    },
    SetPreferences {
        electricity_price_per_kwh: f64,
    },

    // ── Housekeeping ─────────────────────────────────────────────────
    RecordMaintenance {
        kind: MaintenanceKind,
    },
    RunDiagnostics,
    SetLogBuffer {
        enabled: bool,
        size_bytes: u32,
    },
    SetPicoLogForward {
        enabled: bool,
    },
    SyncTime,
    Restart,
    FactoryReset,
}

impl Command {
    /// The `cmd` discriminator on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::SetBrewByWeight(_) => "set_bbw",
            Self::SetPreinfusion(_) => "set_preinfusion",
            Self::StartBrew => "start_brew",
            Self::StopBrew => "stop_brew",
            Self::Tare => "tare",
            Self::ScaleReset => "scale_reset",
            Self::SetMachineInfo { .. } => "set_machine_info",
            Self::SetPowerConfig { .. } => "set_power_config",
            Self::SetEco { .. } => "set_eco",
            Self::SetPreferences { .. } => "set_preferences",
            Self::RecordMaintenance { .. } => "record_maintenance",
            Self::RunDiagnostics => "run_diagnostics",
            Self::SetLogBuffer { .. } => "set_log_buffer",
            Self::SetPicoLogForward { .. } => "set_pico_log_forward",
            Self::SyncTime => "sync_time",
            Self::Restart => "restart",
            Self::FactoryReset => "factory_reset",
        }
    }

    /// The flattened command payload.
    fn payload(&self) -> Value {
        match self {
            Self::SetBrewByWeight(config) => {
                serde_json::to_value(config).unwrap_or(Value::Null)
            }
            Self::SetPreinfusion(config) => {
                serde_json::to_value(config).unwrap_or(Value::Null)
            }
            Self::SetMachineInfo {
                device_name,
                machine_brand,
                machine_model,
                machine_type,
            } => json!({
                "deviceName": device_name,
                "machineBrand": machine_brand,
                "machineModel": machine_model,
                "machineType": machine_type,
            }),
            Self::SetPowerConfig { meter_enabled } => json!({"meterEnabled": meter_enabled}),
            Self::SetEco { enabled } => json!({"enabled": enabled}),
            Self::SetPreferences {
                electricity_price_per_kwh,
            } => json!({"electricityPricePerKwh": electricity_price_per_kwh}),
            Self::RecordMaintenance { kind } => json!({"kind": kind.to_string()}),
            Self::SetLogBuffer {
                enabled,
                size_bytes,
            } => json!({"enabled": enabled, "sizeBytes": size_bytes}),
            Self::SetPicoLogForward { enabled } => json!({"enabled": enabled}),
            Self::StartBrew
            | Self::StopBrew
            | Self::Tare
            | Self::ScaleReset
            | Self::RunDiagnostics
            | Self::SyncTime
            | Self::Restart
            | Self::FactoryReset => Value::Null,
        }
    }

    pub fn to_outbound(&self) -> OutboundCommand {
        OutboundCommand::new(self.wire_name(), self.payload())
    }

    /// Echo the command's predicted effect into the store, tagged
    /// optimistic. Only configuration commands predict anything;
    /// telemetry-producing commands wait for the push.
    fn apply_optimistic(&self, store: &Store) {
        match self {
            Self::SetBrewByWeight(config) => {
                store.brew_by_weight.replace_optimistic(config.clone());
            }
            Self::SetPreinfusion(config) => {
                store.preinfusion.replace_optimistic(config.clone());
            }
            Self::SetMachineInfo {
                device_name,
                machine_brand,
                machine_model,
                machine_type,
            } => {
                let mut identity = store.identity();
                identity.device_name = device_name.clone();
                identity.machine_brand = machine_brand.clone();
                identity.machine_model = machine_model.clone();
                identity.machine_type = *machine_type;
                store.identity.replace_optimistic(identity);
            }
            Self::SetEco { enabled } => {
                let mut machine = store.machine();
                machine.mode = if *enabled {
                    MachineMode::Eco
                } else {
                    MachineMode::On
                };
                store.machine.replace_optimistic(machine);
            }
            _ => {}
        }
    }
}

// ── Transport seam ───────────────────────────────────────────────────

/// Where encoded commands go.
///
/// The live implementation wraps the WebSocket session; demo mode
/// substitutes a sink that accepts everything and sends nothing.
pub trait CommandSink: Send + Sync {
    fn is_connected(&self) -> bool;
    fn send(&self, command: &OutboundCommand) -> Result<(), brewlink_api::Error>;
}

impl CommandSink for brewlink_api::Session {
    fn is_connected(&self) -> bool {
        self.current_state().is_connected()
    }

    fn send(&self, command: &OutboundCommand) -> Result<(), brewlink_api::Error> {
        Self::send(self, command)
    }
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// A user-facing notification raised when a command is handed to the
/// transport. Raised on *send*, not on confirmation — the appliance
/// never confirms synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

/// Per-dispatch options.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Raise a [`Notice`] with this message once the command is sent.
    pub success_message: Option<String>,
}

/// Routes [`Command`]s to the transport with optional optimistic store
/// echo and send notification.
pub struct Dispatcher {
    store: Arc<Store>,
    sink: Arc<dyn CommandSink>,
    notices: broadcast::Sender<Notice>,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>, sink: Arc<dyn CommandSink>) -> Self {
        let (notices, _) = broadcast::channel(16);
        Self {
            store,
            sink,
            notices,
        }
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Dispatch a command.
    ///
    /// Returns `true` when the command was handed to the transport.
    /// When disconnected (or a precondition fails) it returns `false`
    /// with **no** side effects: no frame, no store write, no notice.
    pub fn dispatch(&self, command: Command, options: DispatchOptions) -> bool {
        if !self.sink.is_connected() {
            warn!(cmd = command.wire_name(), "dispatch rejected: not connected");
            return false;
        }

        // Diagnostics need the realtime board alive.
        if matches!(command, Command::RunDiagnostics)
            && !self.store.controller_health().pico_connected
        {
            warn!("dispatch rejected: realtime board not connected");
            return false;
        }

        let outbound = command.to_outbound();
        if let Err(error) = self.sink.send(&outbound) {
            warn!(cmd = command.wire_name(), %error, "dispatch failed to send");
            return false;
        }

        debug!(cmd = command.wire_name(), "command sent");
        command.apply_optimistic(&self.store);

        if let Some(message) = options.success_message {
            let _ = self.notices.send(Notice { message });
        }
        true
    }
}
