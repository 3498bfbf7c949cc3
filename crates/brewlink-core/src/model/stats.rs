// ── Statistics slice ──

use serde::{Deserialize, Serialize};

/// Long-lived counters and rolling aggregates, computed by the appliance.
///
/// Never written optimistically — these are appliance-computed facts,
/// not user-editable settings. The only local mutation path is a full
/// replace from a push update or a statistics poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    // Lifetime
    pub total_shots: u32,
    pub total_kwh: f64,
    pub avg_brew_time_ms: u32,
    pub min_brew_time_ms: u32,
    pub max_brew_time_ms: u32,

    // Rolling windows
    pub shots_today: u32,
    pub weekly_count: u32,
    pub monthly_count: u32,
    pub kwh_today: f64,

    // Maintenance countdowns
    pub shots_since_descale: u32,
    pub shots_since_backflush: u32,
    pub shots_since_group_clean: u32,

    /// Per-day shot counts for the current week, Sunday first. Absent on
    /// firmware that only reports `weekly_count`; `derive::weekly_shots`
    /// fills the gap.
    pub weekly_breakdown: Option<Vec<u32>>,
}
