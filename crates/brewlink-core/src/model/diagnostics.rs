// ── Diagnostics run slice ──
//
// Lifecycle: Idle → (run command) Running, results accumulate in receipt
// order → (terminal summary frame) Complete. A reset returns to Idle and
// clears results and header, never touching any other slice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::identity::MachineType;

/// Status of one diagnostics test, or of the whole run summary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiagStatus {
    #[default]
    Skip,
    Pass,
    Warn,
    Fail,
    Running,
}

/// One test's outcome, appended (or overwritten by `test_id`) as frames
/// arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagResult {
    pub test_id: u8,
    pub name: String,
    pub status: DiagStatus,
    pub message: String,
}

/// Aggregated counts, finalized by the terminal summary frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagHeader {
    pub test_count: u32,
    pub pass_count: u32,
    pub fail_count: u32,
    pub warn_count: u32,
    pub skip_count: u32,
    pub duration_ms: u32,
}

/// The full diagnostics run slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsRun {
    pub header: DiagHeader,
    pub results: Vec<DiagResult>,
    pub is_running: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DiagnosticsRun {
    /// Insert a result, overwriting an earlier result for the same test
    /// while keeping first-receipt order.
    pub fn upsert_result(&mut self, result: DiagResult) {
        if let Some(existing) = self
            .results
            .iter_mut()
            .find(|r| r.test_id == result.test_id)
        {
            *existing = result;
        } else {
            self.results.push(result);
        }
    }
}

// ── Applicable test set ──────────────────────────────────────────────

/// Hardware test identifiers, mirroring the appliance's protocol values.
pub mod test_id {
    pub const BREW_NTC: u8 = 0x01;
    pub const STEAM_NTC: u8 = 0x02;
    pub const PRESSURE: u8 = 0x04;
    pub const WATER_LEVEL: u8 = 0x05;
    pub const SSR_BREW: u8 = 0x06;
    pub const SSR_STEAM: u8 = 0x07;
    pub const RELAY_PUMP: u8 = 0x08;
    pub const RELAY_SOLENOID: u8 = 0x09;
    pub const POWER_METER: u8 = 0x0A;
    pub const STEAM_LEVEL: u8 = 0x0E;
    pub const BREW_SWITCH: u8 = 0x0F;
}

/// The tests a machine of the given type is expected to run.
///
/// Tests outside this set still appear in a run's results — reported as
/// `skip` by the appliance, never omitted — so consumers can render a
/// fixed-length list.
pub fn applicable_tests(machine_type: MachineType) -> &'static [u8] {
    use test_id::{
        BREW_NTC, BREW_SWITCH, POWER_METER, PRESSURE, RELAY_PUMP, RELAY_SOLENOID, SSR_BREW,
        SSR_STEAM, STEAM_LEVEL, STEAM_NTC, WATER_LEVEL,
    };

    match machine_type {
        // No separate steam boiler: steam NTC, steam SSR, and the steam
        // boiler level probe do not apply.
        MachineType::SingleBoiler => &[
            BREW_NTC,
            PRESSURE,
            WATER_LEVEL,
            SSR_BREW,
            RELAY_PUMP,
            RELAY_SOLENOID,
            POWER_METER,
            BREW_SWITCH,
        ],
        // One boiler, but the steam sensor set still exists.
        MachineType::HeatExchanger => &[
            BREW_NTC,
            STEAM_NTC,
            PRESSURE,
            WATER_LEVEL,
            SSR_BREW,
            RELAY_PUMP,
            RELAY_SOLENOID,
            POWER_METER,
            STEAM_LEVEL,
            BREW_SWITCH,
        ],
        MachineType::DualBoiler => &[
            BREW_NTC,
            STEAM_NTC,
            PRESSURE,
            WATER_LEVEL,
            SSR_BREW,
            SSR_STEAM,
            RELAY_PUMP,
            RELAY_SOLENOID,
            POWER_METER,
            STEAM_LEVEL,
            BREW_SWITCH,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_boiler_skips_steam_tests() {
        let tests = applicable_tests(MachineType::SingleBoiler);
        assert!(!tests.contains(&test_id::STEAM_NTC));
        assert!(!tests.contains(&test_id::SSR_STEAM));
        assert!(tests.contains(&test_id::BREW_NTC));
    }

    #[test]
    fn dual_boiler_runs_the_full_set() {
        let tests = applicable_tests(MachineType::DualBoiler);
        assert!(tests.contains(&test_id::STEAM_NTC));
        assert!(tests.contains(&test_id::SSR_STEAM));
        assert!(tests.len() > applicable_tests(MachineType::SingleBoiler).len());
    }

    #[test]
    fn upsert_overwrites_by_test_id_keeping_order() {
        let mut run = DiagnosticsRun::default();
        run.upsert_result(DiagResult {
            test_id: 1,
            status: DiagStatus::Running,
            ..DiagResult::default()
        });
        run.upsert_result(DiagResult {
            test_id: 2,
            status: DiagStatus::Pass,
            ..DiagResult::default()
        });
        run.upsert_result(DiagResult {
            test_id: 1,
            status: DiagStatus::Pass,
            ..DiagResult::default()
        });

        assert_eq!(run.results.len(), 2);
        assert_eq!(run.results[0].test_id, 1);
        assert_eq!(run.results[0].status, DiagStatus::Pass);
    }
}
