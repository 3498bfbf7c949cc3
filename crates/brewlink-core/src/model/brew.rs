// ── Brew configuration and shot session slices ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Brew-by-weight configuration.
///
/// Cross-slice rule (enforced by `store::rules`, not by this type):
/// `enabled` must be false whenever the scale is disconnected. The rule
/// is actively re-asserted on every scale update, not just validated at
/// save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrewByWeightConfig {
    pub enabled: bool,
    /// Input dose, grams.
    pub dose_weight: f64,
    /// Target output, grams.
    pub target_weight: f64,
    /// Stop this many grams before target to account for drip.
    pub stop_offset: f64,
    /// Tare automatically when the portafilter lands on the scale.
    pub auto_tare: bool,
}

impl Default for BrewByWeightConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dose_weight: 18.0,
            target_weight: 36.0,
            stop_offset: 2.0,
            auto_tare: true,
        }
    }
}

/// Pre-infusion configuration. Pure settings, no runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreinfusionConfig {
    pub enabled: bool,
    pub on_time_ms: u16,
    pub pause_time_ms: u16,
}

impl Default for PreinfusionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            on_time_ms: 3000,
            pause_time_ms: 5000,
        }
    }
}

/// The currently running (or most recent) shot.
///
/// Activated by a `brew_start` event, mutated continuously by pushes
/// while active, deactivated on `brew_stop` or `target_reached`.
/// `start_time` is fixed at activation and used to derive elapsed time
/// locally between pushes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShotSession {
    pub active: bool,
    pub start_time: Option<DateTime<Utc>>,
    /// Grams, from the scale.
    pub weight: f64,
    /// Grams per second.
    pub flow_rate: f64,
}
