// ── Temperature and power slices ──

use serde::{Deserialize, Serialize};

/// Boiler and group temperatures (°C) with their setpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Temperatures {
    pub brew_current: f64,
    pub brew_setpoint: f64,
    pub steam_current: f64,
    pub steam_setpoint: f64,
    pub group: f64,
}

/// Electrical load and energy accumulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerStatus {
    pub watts: f64,
    pub voltage: f64,
    /// Energy since midnight, kWh.
    pub today_kwh: f64,
    /// Lifetime energy from the meter, kWh.
    pub total_kwh: f64,
    /// An external power meter is attached and reporting.
    pub meter_connected: bool,
}
