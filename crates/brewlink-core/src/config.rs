// ── Runtime connection configuration ──
//
// Describes *how* to reach one appliance. Built by the embedding
// application and handed to `Appliance::new` — core never reads files.

use std::time::Duration;

use brewlink_api::ReconnectConfig;
use url::Url;

/// Configuration for one appliance connection.
#[derive(Debug, Clone)]
pub struct ApplianceConfig {
    /// Appliance root URL (e.g. `http://brewos.local`). The WebSocket
    /// endpoint is derived from this (`ws://…/ws`).
    pub url: Url,
    /// Route all reads through the demo data provider and simulate all
    /// writes locally. No network traffic is generated.
    pub demo_mode: bool,
    /// REST request timeout.
    pub timeout: Duration,
    /// WebSocket reconnection backoff.
    pub reconnect: ReconnectConfig,
    /// Cloud-pairing status poll period.
    pub pairing_poll: Duration,
    /// Device log-buffer info poll period.
    pub log_info_poll: Duration,
    /// Time/NTP status poll period.
    pub time_poll: Duration,
    /// Extended statistics poll period.
    pub stats_poll: Duration,
    /// Electricity price per kWh, for energy cost estimates.
    pub electricity_price_per_kwh: f64,
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            url: "http://brewos.local"
                .parse()
                .expect("default appliance URL"),
            demo_mode: false,
            timeout: Duration::from_secs(10),
            reconnect: ReconnectConfig::default(),
            pairing_poll: Duration::from_secs(3),
            log_info_poll: Duration::from_secs(10),
            time_poll: Duration::from_secs(10),
            stats_poll: Duration::from_secs(30),
            electricity_price_per_kwh: 0.15,
        }
    }
}

impl ApplianceConfig {
    /// Derive the WebSocket endpoint from the appliance root URL.
    pub fn ws_url(&self) -> Result<Url, url::ParseError> {
        let mut ws = self.url.join("ws")?;
        let scheme = if self.url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        // set_scheme only rejects invalid transitions; ws/wss from http/https is fine.
        let _ = ws.set_scheme(scheme);
        Ok(ws)
    }
}
