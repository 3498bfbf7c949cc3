//! Wire frame encoding and decoding.
//!
//! Every message the appliance pushes is a JSON object with a `"type"`
//! discriminator naming the state slice it carries; the remaining fields
//! are that slice's payload. Outbound commands use the shape
//! `{"type": "command", "cmd": <name>, ...payload}`.

use serde_json::{Map, Value, json};

use crate::error::Error;

// ── Inbound frames ───────────────────────────────────────────────────

/// Telemetry frame kinds the appliance is known to push.
///
/// Unknown discriminators are preserved in [`FrameKind::Unknown`] so the
/// consumer can log and skip them — new firmware may add kinds at any
/// time and must never break older clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Unified machine status: state, temperatures, pressure, power, scale.
    Status,
    /// Device identity and saved configuration.
    DeviceInfo,
    /// Scale connection and reading.
    ScaleStatus,
    /// Brew-by-weight configuration echo.
    BbwSettings,
    /// External power meter reading.
    PowerMeterStatus,
    /// Diagnostics run progress and results.
    Diagnostics,
    /// Time/NTP sync status.
    TimeStatus,
    /// Appliance log line.
    Log,
    /// Discrete appliance event (brew started, target reached, ...).
    Event,
    /// Anything this client version does not understand.
    Unknown(String),
}

impl FrameKind {
    fn from_wire(s: &str) -> Self {
        match s {
            "status" => Self::Status,
            "device_info" => Self::DeviceInfo,
            "scale_status" => Self::ScaleStatus,
            "bbw_settings" => Self::BbwSettings,
            "power_meter_status" => Self::PowerMeterStatus,
            "diagnostics" => Self::Diagnostics,
            "time_status" => Self::TimeStatus,
            "log" => Self::Log,
            "event" => Self::Event,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// The wire name of this kind, for logging.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Status => "status",
            Self::DeviceInfo => "device_info",
            Self::ScaleStatus => "scale_status",
            Self::BbwSettings => "bbw_settings",
            Self::PowerMeterStatus => "power_meter_status",
            Self::Diagnostics => "diagnostics",
            Self::TimeStatus => "time_status",
            Self::Log => "log",
            Self::Event => "event",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

/// A decoded inbound frame: the slice kind plus its raw payload.
///
/// Payloads stay as `serde_json::Value` here — the domain layer owns the
/// typed slice shapes and performs the final deserialization so that the
/// transport crate has no knowledge of domain types.
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Value,
}

impl Frame {
    /// Decode a WebSocket text frame.
    ///
    /// The `"type"` field is consumed as the discriminator; everything
    /// else is the payload. A frame without a `"type"` string is a
    /// protocol violation and yields a deserialization error.
    pub fn decode(text: &str) -> Result<Self, Error> {
        let mut obj: Map<String, Value> =
            serde_json::from_str(text).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: text.to_owned(),
            })?;

        let kind = match obj.remove("type") {
            Some(Value::String(s)) => FrameKind::from_wire(&s),
            _ => {
                return Err(Error::Deserialization {
                    message: "frame is missing the \"type\" discriminator".into(),
                    body: text.to_owned(),
                });
            }
        };

        Ok(Self {
            kind,
            payload: Value::Object(obj),
        })
    }
}

// ── Outbound frames ──────────────────────────────────────────────────

/// An outbound command frame.
///
/// Fire-and-forget: the appliance sends no synchronous reply. Effects
/// are confirmed only by a later telemetry push reflecting the change.
#[derive(Debug, Clone)]
pub struct OutboundCommand {
    pub name: String,
    pub payload: Value,
}

impl OutboundCommand {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Serialize to the wire shape `{"type":"command","cmd":<name>, ...}`.
    ///
    /// Payload fields are flattened to the top level; a non-object payload
    /// is placed under `"value"`.
    pub fn encode(&self) -> String {
        let mut obj = Map::new();
        obj.insert("type".into(), json!("command"));
        obj.insert("cmd".into(), json!(self.name));

        match &self.payload {
            Value::Object(fields) => {
                for (k, v) in fields {
                    obj.insert(k.clone(), v.clone());
                }
            }
            Value::Null => {}
            other => {
                obj.insert("value".into(), other.clone());
            }
        }

        Value::Object(obj).to_string()
    }

    /// The `request_state` frame sent right after connecting, asking the
    /// appliance to push a full snapshot of every slice.
    pub fn request_state() -> String {
        json!({"type": "request_state"}).to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_known_kind() {
        let frame = Frame::decode(r#"{"type":"scale_status","connected":true,"weight":17.4}"#)
            .unwrap();
        assert_eq!(frame.kind, FrameKind::ScaleStatus);
        assert_eq!(frame.payload["connected"], true);
        assert_eq!(frame.payload["weight"], 17.4);
        // The discriminator must not leak into the payload.
        assert!(frame.payload.get("type").is_none());
    }

    #[test]
    fn decode_unknown_kind_is_preserved() {
        let frame = Frame::decode(r#"{"type":"grinder_status","rpm":900}"#).unwrap();
        assert_eq!(frame.kind, FrameKind::Unknown("grinder_status".into()));
        assert_eq!(frame.kind.as_str(), "grinder_status");
    }

    #[test]
    fn decode_rejects_missing_discriminator() {
        let err = Frame::decode(r#"{"weight": 1.0}"#).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn decode_rejects_malformed_json() {
        assert!(Frame::decode("not json at all").is_err());
    }

    #[test]
    fn encode_command_flattens_payload() {
        let cmd = OutboundCommand::new(
            "set_bbw",
            serde_json::json!({"enabled": false, "targetWeight": 36.0}),
        );
        let wire: Value = serde_json::from_str(&cmd.encode()).unwrap();
        assert_eq!(wire["type"], "command");
        assert_eq!(wire["cmd"], "set_bbw");
        assert_eq!(wire["enabled"], false);
        assert_eq!(wire["targetWeight"], 36.0);
    }

    #[test]
    fn encode_command_with_empty_payload() {
        let cmd = OutboundCommand::new("tare", Value::Null);
        let wire: Value = serde_json::from_str(&cmd.encode()).unwrap();
        assert_eq!(wire["type"], "command");
        assert_eq!(wire["cmd"], "tare");
        assert_eq!(wire.as_object().unwrap().len(), 2);
    }
}
