// ── Machine state slice ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The controller's reported operating state.
///
/// Values must match the appliance's wire strings exactly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MachineState {
    #[default]
    Init,
    Idle,
    Heating,
    Ready,
    Brewing,
    Fault,
    Safe,
    Eco,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MachineMode {
    #[default]
    Standby,
    On,
    Eco,
}

/// Top-level machine status pushed in the unified `status` frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineSnapshot {
    pub state: MachineState,
    pub mode: MachineMode,
    pub is_heating: bool,
    pub is_brewing: bool,
    pub water_low: bool,
    /// Unix milliseconds when the machine entered an active state;
    /// absent while standby or when appliance time is unsynced.
    pub machine_on_timestamp: Option<u64>,
    /// Unix milliseconds of the last completed shot.
    pub last_shot_timestamp: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_wire_strings() {
        for (wire, state) in [
            ("idle", MachineState::Idle),
            ("heating", MachineState::Heating),
            ("brewing", MachineState::Brewing),
            ("safe", MachineState::Safe),
        ] {
            let parsed: MachineState =
                serde_json::from_value(serde_json::json!(wire)).expect("deserialize");
            assert_eq!(parsed, state);
            assert_eq!(state.to_string(), wire);
        }
    }
}
