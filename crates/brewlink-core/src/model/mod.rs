// ── Slice model ──
//
// Every type in this module is one flat, independently-addressable slice
// of appliance state. Slices never nest inside one another and never
// share identity — cross-slice values live in `crate::derive`, computed
// on read, never stored.
//
// All wire payloads are camelCase JSON; `#[serde(default)]` keeps a
// full-slice replace well-defined when a frame omits a field.

pub mod brew;
pub mod diagnostics;
pub mod identity;
pub mod machine;
pub mod network;
pub mod scale;
pub mod stats;
pub mod telemetry;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use brewlink_core::model::*` gives you everything.

pub use identity::{DeviceIdentity, MachineType};

pub use machine::{MachineMode, MachineSnapshot, MachineState};

pub use scale::ScaleStatus;

pub use brew::{BrewByWeightConfig, PreinfusionConfig, ShotSession};

pub use telemetry::{PowerStatus, Temperatures};

pub use stats::Statistics;

pub use diagnostics::{
    DiagHeader, DiagResult, DiagStatus, DiagnosticsRun, applicable_tests,
};

pub use network::{
    ApplianceEvent, ControllerHealth, LogBufferInfo, LogEntry, LogLevel, NetworkStatus,
    PairingStatus, Schedule, ScheduleAction, TimeStatus, WifiNetwork,
};
