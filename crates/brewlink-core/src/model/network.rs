// ── Connectivity, health, and housekeeping slices ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Wi-Fi link status as the appliance sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkStatus {
    pub connected: bool,
    /// Serving its own provisioning access point instead of joining one.
    pub ap_mode: bool,
    pub ssid: String,
    /// Signal strength, dBm. Negative when connected.
    pub rssi: i16,
    pub ip: String,
}

/// Internal controller-board and uplink health.
///
/// `pico_connected` gates operations that need the realtime board alive,
/// most notably running hardware diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerHealth {
    pub pico_connected: bool,
    pub pico_version: String,
    pub cloud_connected: bool,
    pub mqtt_connected: bool,
}

/// Cloud pairing progress, refreshed by REST polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PairingStatus {
    pub paired: bool,
    /// Short code shown to the user while pairing is pending.
    pub pairing_code: Option<String>,
    pub cloud_url: Option<String>,
}

/// On-appliance log buffer capacity, refreshed by REST polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogBufferInfo {
    pub enabled: bool,
    pub size_bytes: u64,
    pub entry_count: u32,
}

/// One network visible in a Wi-Fi scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WifiNetwork {
    pub ssid: String,
    pub rssi: i16,
    pub secure: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScheduleAction {
    #[default]
    TurnOn,
    TurnOff,
}

/// A power schedule entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    pub id: u8,
    pub enabled: bool,
    /// Day-of-week bitmask, bit 0 = Sunday.
    pub days: u8,
    pub hour: u8,
    pub minute: u8,
    pub action: ScheduleAction,
    pub name: String,
}

impl Schedule {
    /// Whether this schedule fires on the given Sunday-first day index.
    pub fn fires_on(&self, day: u8) -> bool {
        day < 7 && self.days & (1 << day) != 0
    }
}

/// Appliance clock state, refreshed by REST polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeStatus {
    pub synced: bool,
    pub ntp_enabled: bool,
    /// Appliance-local time as reported, not our clock.
    pub current_time: Option<DateTime<Utc>>,
    pub utc_offset_minutes: i16,
}

// ── Log stream ──────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// One line from the appliance's log stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Firmware subsystem tag, e.g. `"ble"` or `"heater"`.
    pub tag: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

// ── Discrete events ─────────────────────────────────────────────────

/// Momentary occurrences broadcast to subscribers alongside slice
/// updates. Events are not state: missing one never leaves the store
/// wrong, only a listener uninformed.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplianceEvent {
    BrewStarted,
    BrewStopped,
    /// Brew-by-weight hit its target and the appliance cut the pump.
    TargetReached,
    ScaleConnected,
    ScaleDisconnected,
    /// Machine entered the fault state; message from the appliance.
    Fault(String),
    DiagnosticsComplete,
    /// A log line arrived (also appended to the log ring).
    Log(LogEntry),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_ordering_supports_filtering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Debug);
    }

    #[test]
    fn pairing_status_defaults() {
        let status: PairingStatus = serde_json::from_str("{}").expect("deserialize");
        assert!(!status.paired);
        assert!(status.pairing_code.is_none());
    }
}
