// ── Wire → domain conversion ──
//
// The transport crate ships untyped payloads and plain wire documents;
// everything crossing into the domain layer goes through the `From`
// impls here so slice types never leak transport shapes.

use brewlink_api::rest::{
    ExtendedStatsDoc, LogBufferInfoDoc, PairingStatusDoc, ScheduleDoc, TimeStatusDoc,
    WifiNetworkDoc,
};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::model::{
    LogBufferInfo, PairingStatus, Schedule, ScheduleAction, Statistics, TimeStatus, WifiNetwork,
};

impl From<PairingStatusDoc> for PairingStatus {
    fn from(doc: PairingStatusDoc) -> Self {
        Self {
            paired: doc.paired,
            pairing_code: doc.pairing_code,
            cloud_url: doc.cloud_url,
        }
    }
}

impl From<LogBufferInfoDoc> for LogBufferInfo {
    fn from(doc: LogBufferInfoDoc) -> Self {
        Self {
            enabled: doc.enabled,
            size_bytes: doc.size_bytes,
            entry_count: doc.entry_count,
        }
    }
}

impl From<TimeStatusDoc> for TimeStatus {
    fn from(doc: TimeStatusDoc) -> Self {
        // An unparseable timestamp degrades to "time unknown" rather
        // than failing the whole poll.
        let current_time = doc.current_time.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|error| warn!(raw, %error, "unparseable appliance time"))
                .ok()
        });

        Self {
            synced: doc.synced,
            ntp_enabled: doc.ntp_enabled,
            current_time,
            utc_offset_minutes: doc.utc_offset_minutes,
        }
    }
}

// The statistics poll full-replaces the slice, so the doc must cover
// every field — a shape gap here would zero whatever a push last wrote.
impl From<ExtendedStatsDoc> for Statistics {
    fn from(doc: ExtendedStatsDoc) -> Self {
        Self {
            total_shots: doc.total_shots,
            total_kwh: doc.total_kwh,
            avg_brew_time_ms: doc.avg_brew_time_ms,
            min_brew_time_ms: doc.min_brew_time_ms,
            max_brew_time_ms: doc.max_brew_time_ms,
            shots_today: doc.shots_today,
            weekly_count: doc.weekly_count,
            monthly_count: doc.monthly_count,
            kwh_today: doc.kwh_today,
            shots_since_descale: doc.shots_since_descale,
            shots_since_backflush: doc.shots_since_backflush,
            shots_since_group_clean: doc.shots_since_group_clean,
            weekly_breakdown: doc.weekly_breakdown,
        }
    }
}

impl From<WifiNetworkDoc> for WifiNetwork {
    fn from(doc: WifiNetworkDoc) -> Self {
        Self {
            ssid: doc.ssid,
            rssi: doc.rssi,
            secure: doc.secure,
        }
    }
}

impl From<ScheduleDoc> for Schedule {
    fn from(doc: ScheduleDoc) -> Self {
        let action = doc.action.parse().unwrap_or_else(|_| {
            warn!(action = %doc.action, "unknown schedule action; assuming turn_on");
            ScheduleAction::TurnOn
        });
        Self {
            id: doc.id,
            enabled: doc.enabled,
            days: doc.days,
            hour: doc.hour,
            minute: doc.minute,
            action,
            name: doc.name,
        }
    }
}

impl From<&Schedule> for ScheduleDoc {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id,
            enabled: schedule.enabled,
            days: schedule.days,
            hour: schedule.hour,
            minute: schedule.minute,
            action: schedule.action.to_string(),
            name: schedule.name.clone(),
        }
    }
}
