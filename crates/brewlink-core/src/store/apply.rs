// ── Frame application logic ──
//
// Applies decoded wire frames to the `Store` in arrival order. Every
// accepted payload is a full-slice replace; a malformed payload is
// logged and dropped without touching the slice.

use brewlink_api::{Frame, FrameKind};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::Store;
use crate::model::{
    ApplianceEvent, BrewByWeightConfig, ControllerHealth, DeviceIdentity, DiagHeader, DiagResult,
    LogEntry, MachineSnapshot, NetworkStatus, PowerStatus, PreinfusionConfig, ScaleStatus,
    ShotSession, Statistics, Temperatures, TimeStatus,
};

impl Store {
    /// Apply one inbound frame, returning the discrete events it raised.
    ///
    /// Called from a single pump task; a frame's effect on any one slice
    /// is atomic (one `watch` send).
    pub fn apply_frame(&self, frame: &Frame) -> Vec<ApplianceEvent> {
        let mut events = Vec::new();

        match &frame.kind {
            FrameKind::Status => self.apply_status(&frame.payload, &mut events),
            FrameKind::DeviceInfo => {
                if let Some(identity) = parse_slice::<DeviceIdentity>(&frame.payload, "device_info")
                {
                    self.identity.replace(identity);
                }
            }
            FrameKind::ScaleStatus => {
                if let Some(scale) = parse_slice::<ScaleStatus>(&frame.payload, "scale_status") {
                    self.replace_scale(scale, &mut events);
                }
            }
            FrameKind::BbwSettings => {
                if let Some(config) =
                    parse_slice::<BrewByWeightConfig>(&frame.payload, "bbw_settings")
                {
                    self.brew_by_weight.replace(config);
                }
            }
            FrameKind::PowerMeterStatus => {
                if let Some(power) = parse_slice::<PowerStatus>(&frame.payload, "power_meter") {
                    self.power.replace(power);
                }
            }
            FrameKind::Diagnostics => self.apply_diagnostics(&frame.payload, &mut events),
            FrameKind::TimeStatus => {
                if let Some(time) = parse_slice::<TimeStatus>(&frame.payload, "time_status") {
                    self.time.replace(time);
                }
            }
            FrameKind::Log => {
                if let Some(entry) = parse_slice::<LogEntry>(&frame.payload, "log") {
                    self.push_log(entry.clone());
                    events.push(ApplianceEvent::Log(entry));
                }
            }
            FrameKind::Event => self.apply_event(&frame.payload, &mut events),
            FrameKind::Unknown(kind) => {
                debug!(kind, "ignoring unknown frame kind");
            }
        }

        let _ = self.last_frame_at.send(Some(Utc::now()));
        events
    }

    /// The unified `status` frame carries optional sections, one per
    /// slice. A present section replaces its slice wholesale; an absent
    /// section leaves the slice untouched.
    fn apply_status(&self, payload: &Value, events: &mut Vec<ApplianceEvent>) {
        if let Some(machine) = section::<MachineSnapshot>(payload, "machine") {
            self.machine.replace(machine);
        }
        if let Some(temps) = section::<Temperatures>(payload, "temps") {
            self.temperatures.replace(temps);
        }
        if let Some(scale) = section::<ScaleStatus>(payload, "scale") {
            self.replace_scale(scale, events);
        }
        if let Some(bbw) = section::<BrewByWeightConfig>(payload, "bbw") {
            self.brew_by_weight.replace(bbw);
        }
        if let Some(preinfusion) = section::<PreinfusionConfig>(payload, "preinfusion") {
            self.preinfusion.replace(preinfusion);
        }
        if let Some(shot) = section::<ShotSession>(payload, "shot") {
            self.shot.replace(shot);
        }
        if let Some(stats) = section::<Statistics>(payload, "stats") {
            self.statistics.replace(stats);
        }
        if let Some(network) = section::<NetworkStatus>(payload, "network") {
            self.network.replace(network);
        }
        if let Some(health) = section::<ControllerHealth>(payload, "health") {
            self.controller_health.replace(health);
        }
    }

    /// Scale replaces also surface connect/disconnect transitions as
    /// events so the brew-by-weight rule can react in the same turn.
    fn replace_scale(&self, scale: ScaleStatus, events: &mut Vec<ApplianceEvent>) {
        let was_connected = self.scale.get().connected;
        let is_connected = scale.connected;
        self.scale.replace(scale);

        if is_connected && !was_connected {
            events.push(ApplianceEvent::ScaleConnected);
        } else if !is_connected && was_connected {
            events.push(ApplianceEvent::ScaleDisconnected);
        }
    }

    /// Diagnostics frames arrive in phases: `started` resets the run,
    /// `result` upserts one test outcome, `complete` finalizes the
    /// header and clears `is_running`.
    fn apply_diagnostics(&self, payload: &Value, events: &mut Vec<ApplianceEvent>) {
        let Some(phase) = payload.get("phase").and_then(Value::as_str) else {
            warn!("diagnostics frame missing phase; dropped");
            return;
        };

        match phase {
            "started" => {
                self.diagnostics.update(|run| {
                    *run = crate::model::DiagnosticsRun {
                        is_running: true,
                        timestamp: Some(Utc::now()),
                        ..crate::model::DiagnosticsRun::default()
                    };
                });
            }
            "result" => {
                if let Some(result) = section::<DiagResult>(payload, "result") {
                    self.diagnostics.update(|run| run.upsert_result(result));
                }
            }
            "complete" => {
                let header = section::<DiagHeader>(payload, "summary");
                self.diagnostics.update(|run| {
                    if let Some(header) = header {
                        run.header = header;
                    }
                    run.is_running = false;
                });
                events.push(ApplianceEvent::DiagnosticsComplete);
            }
            other => {
                debug!(phase = other, "ignoring unknown diagnostics phase");
            }
        }
    }

    /// Discrete event frames. Brew events also drive the shot session
    /// slice; everything else only notifies listeners.
    fn apply_event(&self, payload: &Value, events: &mut Vec<ApplianceEvent>) {
        let Some(name) = payload.get("event").and_then(Value::as_str) else {
            warn!("event frame missing event name; dropped");
            return;
        };

        match name {
            "brew_start" => {
                self.shot.replace(ShotSession {
                    active: true,
                    start_time: Some(Utc::now()),
                    weight: 0.0,
                    flow_rate: 0.0,
                });
                events.push(ApplianceEvent::BrewStarted);
            }
            "brew_stop" => {
                self.shot.update(|shot| shot.active = false);
                events.push(ApplianceEvent::BrewStopped);
            }
            "target_reached" => {
                self.shot.update(|shot| shot.active = false);
                events.push(ApplianceEvent::TargetReached);
            }
            "fault" => {
                let message = payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                events.push(ApplianceEvent::Fault(message));
            }
            other => {
                debug!(event = other, "ignoring unknown appliance event");
            }
        }
    }
}

/// Parse a named section out of a composite payload.
fn section<T: DeserializeOwned>(payload: &Value, key: &str) -> Option<T> {
    let value = payload.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            warn!(section = key, %error, "malformed payload section; dropped");
            None
        }
    }
}

/// Parse a whole-frame payload as a single slice.
fn parse_slice<T: DeserializeOwned>(payload: &Value, kind: &str) -> Option<T> {
    match serde_json::from_value(payload.clone()) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            warn!(kind, %error, "malformed frame payload; dropped");
            None
        }
    }
}
