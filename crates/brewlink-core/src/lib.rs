// brewlink-core: reactive domain layer between brewlink-api and consumers.

pub mod appliance;
pub mod config;
pub mod convert;
pub mod demo;
pub mod derive;
pub mod dispatch;
pub mod draft;
pub mod error;
pub mod model;
pub mod poll;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use appliance::{Appliance, ConnectionState};
pub use config::ApplianceConfig;
pub use dispatch::{Command, CommandSink, DispatchOptions, Dispatcher, MaintenanceKind, Notice};
pub use draft::Draft;
pub use error::CoreError;
pub use poll::PollHandle;
pub use store::{Provenance, Store, Tagged};
pub use stream::SliceStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ApplianceEvent, BrewByWeightConfig, ControllerHealth, DeviceIdentity, DiagHeader, DiagResult,
    DiagStatus, DiagnosticsRun, LogBufferInfo, LogEntry, LogLevel, MachineMode, MachineSnapshot,
    MachineState, MachineType, NetworkStatus, PairingStatus, PowerStatus, PreinfusionConfig,
    ScaleStatus, Schedule, ScheduleAction, ShotSession, Statistics, Temperatures, TimeStatus,
    WifiNetwork,
};
