//! REST polling client.
//!
//! A few state facts are not pushed over the WebSocket and must be
//! re-fetched on an interval: cloud-pairing status, the device log buffer,
//! time/NTP sync, extended statistics, WiFi scans, and schedule CRUD.
//! Responses are plain JSON documents with no envelope.
//!
//! The wire document types here are transport shapes; the domain layer
//! converts them into its own slice types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;

// ── Wire documents ───────────────────────────────────────────────────

/// `GET /api/pairing/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PairingStatusDoc {
    #[serde(default)]
    pub paired: bool,
    #[serde(default)]
    pub pairing_code: Option<String>,
    #[serde(default)]
    pub cloud_url: Option<String>,
}

/// `GET /api/logs/info`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogBufferInfoDoc {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub entry_count: u32,
}

/// `GET /api/time/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeStatusDoc {
    #[serde(default)]
    pub synced: bool,
    #[serde(default)]
    pub ntp_enabled: bool,
    #[serde(default)]
    pub current_time: Option<String>,
    #[serde(default)]
    pub utc_offset_minutes: i16,
}

/// `GET /api/statistics` — server-computed aggregates.
///
/// `weekly_breakdown` is optional: older firmware only reports the raw
/// weekly count and the client synthesizes a breakdown locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedStatsDoc {
    #[serde(default)]
    pub total_shots: u32,
    #[serde(default)]
    pub shots_today: u32,
    #[serde(default)]
    pub weekly_count: u32,
    #[serde(default)]
    pub monthly_count: u32,
    #[serde(default)]
    pub avg_brew_time_ms: u32,
    #[serde(default)]
    pub min_brew_time_ms: u32,
    #[serde(default)]
    pub max_brew_time_ms: u32,
    #[serde(default)]
    pub kwh_today: f64,
    #[serde(default)]
    pub total_kwh: f64,
    #[serde(default)]
    pub shots_since_descale: u32,
    #[serde(default)]
    pub shots_since_backflush: u32,
    #[serde(default)]
    pub shots_since_group_clean: u32,
    #[serde(default)]
    pub weekly_breakdown: Option<Vec<u32>>,
}

/// One network from `GET /api/wifi/scan`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WifiNetworkDoc {
    pub ssid: String,
    #[serde(default)]
    pub rssi: i16,
    #[serde(default)]
    pub secure: bool,
}

/// A power schedule entry (`/api/schedules`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDoc {
    #[serde(default)]
    pub id: u8,
    #[serde(default)]
    pub enabled: bool,
    /// Day-of-week bitmask, bit 0 = Sunday.
    #[serde(default)]
    pub days: u8,
    #[serde(default)]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
    /// `"turn_on"` or `"turn_off"`.
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub name: String,
}

// ── RestClient ───────────────────────────────────────────────────────

/// HTTP client for the appliance's request/response endpoints.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// Create a client against the appliance root URL
    /// (e.g. `http://brewos.local`).
    pub fn new(base_url: Url, timeout: std::time::Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("brewlink/0.1.0")
            .build()
            .map_err(Error::Transport)?;
        Ok(Self { http, base_url })
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Polled read models ───────────────────────────────────────────

    /// `GET /api/pairing/status`
    pub async fn pairing_status(&self) -> Result<PairingStatusDoc, Error> {
        self.get("api/pairing/status").await
    }

    /// `GET /api/logs/info`
    pub async fn log_buffer_info(&self) -> Result<LogBufferInfoDoc, Error> {
        self.get("api/logs/info").await
    }

    /// `GET /api/time/status`
    pub async fn time_status(&self) -> Result<TimeStatusDoc, Error> {
        self.get("api/time/status").await
    }

    /// `GET /api/statistics`
    pub async fn extended_statistics(&self) -> Result<ExtendedStatsDoc, Error> {
        self.get("api/statistics").await
    }

    /// `GET /api/wifi/scan` — triggers a scan and returns visible networks.
    pub async fn wifi_scan(&self) -> Result<Vec<WifiNetworkDoc>, Error> {
        self.get("api/wifi/scan").await
    }

    // ── Schedule CRUD ────────────────────────────────────────────────

    /// `GET /api/schedules`
    pub async fn list_schedules(&self) -> Result<Vec<ScheduleDoc>, Error> {
        self.get("api/schedules").await
    }

    /// `POST /api/schedules` — returns the created entry with its id.
    pub async fn create_schedule(&self, entry: &ScheduleDoc) -> Result<ScheduleDoc, Error> {
        self.post("api/schedules", entry).await
    }

    /// `PUT /api/schedules/{id}`
    pub async fn update_schedule(&self, entry: &ScheduleDoc) -> Result<ScheduleDoc, Error> {
        self.put(&format!("api/schedules/{}", entry.id), entry).await
    }

    /// `DELETE /api/schedules/{id}`
    pub async fn delete_schedule(&self, id: u8) -> Result<(), Error> {
        let url = self.endpoint(&format!("api/schedules/{id}"))?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await.map_err(Error::Transport)?;
        Self::check_status(&resp)?;
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_body(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_body(resp).await
    }

    async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("PUT {url}");

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_body(resp).await
    }

    fn check_status(resp: &reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Appliance {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .into(),
            })
        }
    }

    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Appliance {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
