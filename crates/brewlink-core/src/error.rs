// ── Core error types ──
//
// User-facing errors from brewlink-core. These are NOT transport-specific —
// consumers never see HTTP status codes or WebSocket close frames directly.
// The `From<brewlink_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach appliance at {url}: {reason}")]
    ApplianceUnreachable { url: String, reason: String },

    #[error("Appliance disconnected")]
    Disconnected,

    #[error("Appliance request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Appliance returned an error (HTTP {status}): {message}")]
    Appliance { status: u16, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<brewlink_api::Error> for CoreError {
    fn from(err: brewlink_api::Error) -> Self {
        match err {
            brewlink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ApplianceUnreachable {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Internal(e.to_string())
                }
            }
            brewlink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            brewlink_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            brewlink_api::Error::WebSocketConnect(reason) => CoreError::ApplianceUnreachable {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            brewlink_api::Error::WebSocketClosed { code, reason } => {
                CoreError::ApplianceUnreachable {
                    url: String::new(),
                    reason: format!("WebSocket closed (code {code}): {reason}"),
                }
            }
            brewlink_api::Error::NotConnected => CoreError::Disconnected,
            brewlink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            brewlink_api::Error::Appliance { status, message } => {
                CoreError::Appliance { status, message }
            }
        }
    }
}
