// ── Device identity slice ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The hydraulic/thermal architecture of the machine.
///
/// Drives which derived computations apply — most visibly the set of
/// diagnostics tests a machine is expected to run (a single-boiler
/// machine skips steam-boiler tests, reported as skipped rather than
/// omitted).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MachineType {
    SingleBoiler,
    HeatExchanger,
    #[default]
    DualBoiler,
}

/// Who this appliance is. Replaced wholesale by `device_info` frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub device_name: String,
    pub machine_brand: String,
    pub machine_model: String,
    pub machine_type: MachineType,
    pub firmware_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_type_wire_names() {
        assert_eq!(
            serde_json::to_value(MachineType::HeatExchanger).expect("serialize"),
            serde_json::json!("heat_exchanger")
        );
        let parsed: MachineType =
            serde_json::from_value(serde_json::json!("single_boiler")).expect("deserialize");
        assert_eq!(parsed, MachineType::SingleBoiler);
    }

    #[test]
    fn identity_defaults_fill_missing_fields() {
        let identity: DeviceIdentity =
            serde_json::from_str(r#"{"deviceName":"Kitchen ECM"}"#).expect("deserialize");
        assert_eq!(identity.device_name, "Kitchen ECM");
        assert_eq!(identity.machine_type, MachineType::DualBoiler);
        assert!(identity.device_id.is_empty());
    }
}
