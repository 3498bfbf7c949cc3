// ── Scale status slice ──

use serde::{Deserialize, Serialize};

/// Bluetooth scale connection and live reading.
///
/// `weight` and `flow_rate` are meaningful only while `connected` is
/// true; `stable` is a settling signal from the scale, not a
/// correctness guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleStatus {
    pub connected: bool,
    pub name: String,
    /// Scale vendor/protocol family, e.g. `"acaia"` or `"felicita"`.
    pub kind: String,
    /// Grams.
    pub weight: f64,
    /// Grams per second.
    pub flow_rate: f64,
    pub stable: bool,
    /// Battery percentage, 0–100.
    pub battery: u8,
}
