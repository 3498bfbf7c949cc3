//! Persistent WebSocket session with auto-reconnect.
//!
//! Owns the one logical duplex connection to the appliance. Inbound text
//! frames are decoded into [`Frame`]s and fanned out through a
//! [`tokio::sync::broadcast`] channel; outbound commands are accepted only
//! while the session is [`SessionState::Connected`]. Reconnection uses
//! exponential backoff with jitter.
//!
//! # Example
//!
//! ```rust,ignore
//! use brewlink_api::session::{Session, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let ws_url = Url::parse("ws://brewos.local/ws")?;
//!
//! let session = Session::connect(ws_url, ReconnectConfig::default(), cancel.clone());
//! let mut frames = session.subscribe();
//!
//! while let Ok(frame) = frames.recv().await {
//!     println!("{}: {}", frame.kind.as_str(), frame.payload);
//! }
//!
//! session.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::frame::{Frame, OutboundCommand};

const FRAME_CHANNEL_CAPACITY: usize = 1024;
const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

// ── SessionState ─────────────────────────────────────────────────────

/// Observable connection state of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
    },
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Handle to a running appliance session.
///
/// Cheaply cloneable. Drop all handles and call
/// [`shutdown`](Self::shutdown) to tear down the background task.
#[derive(Clone)]
pub struct Session {
    frame_tx: broadcast::Sender<Arc<Frame>>,
    outbound_tx: mpsc::Sender<String>,
    state_rx: watch::Receiver<SessionState>,
    cancel: CancellationToken,
}

impl Session {
    /// Spawn the connection loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously — watch
    /// [`state`](Self::state) or subscribe to frames to observe progress.
    pub fn connect(ws_url: Url, reconnect: ReconnectConfig, cancel: CancellationToken) -> Self {
        let (frame_tx, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);

        let task_frame_tx = frame_tx.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            session_loop(
                ws_url,
                task_frame_tx,
                outbound_rx,
                state_tx,
                reconnect,
                task_cancel,
            )
            .await;
        });

        Self {
            frame_tx,
            outbound_tx,
            state_rx,
            cancel,
        }
    }

    /// Get a new broadcast receiver for the inbound frame stream.
    ///
    /// Multiple consumers can subscribe concurrently. A consumer that
    /// falls behind receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Frame>> {
        self.frame_tx.subscribe()
    }

    /// Subscribe to session state changes.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Current session state.
    pub fn current_state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Send a command frame.
    ///
    /// Rejected immediately with [`Error::NotConnected`] while the session
    /// is not `Connected` — commands are never queued across a disconnect.
    pub fn send(&self, command: &OutboundCommand) -> Result<(), Error> {
        if !self.state_rx.borrow().is_connected() {
            return Err(Error::NotConnected);
        }

        self.outbound_tx
            .try_send(command.encode())
            .map_err(|_| Error::NotConnected)
    }

    /// Signal the background task to shut down gracefully.
    ///
    /// The state transitions to `Disconnected` once the task exits.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background connection loop ───────────────────────────────────────

/// Main loop: connect → pump → on error, backoff → reconnect.
async fn session_loop(
    ws_url: Url,
    frame_tx: broadcast::Sender<Arc<Frame>>,
    mut outbound_rx: mpsc::Receiver<String>,
    state_tx: watch::Sender<SessionState>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let _ = state_tx.send(SessionState::Connecting);

        let result = connect_and_pump(&ws_url, &frame_tx, &mut outbound_rx, &state_tx, &cancel);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = result => {
                match result {
                    // Clean disconnect (server close frame or stream ended).
                    // Reset the attempt counter and reconnect immediately.
                    Ok(()) => {
                        tracing::info!("session disconnected cleanly, reconnecting");
                        attempt = 0;
                        let _ = state_tx.send(SessionState::Reconnecting { attempt });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "session error");

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                tracing::error!(
                                    max_retries = max,
                                    "reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let _ = state_tx.send(SessionState::Reconnecting { attempt });
                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(delay) => {}
                        }

                        attempt += 1;
                    }
                }
            }
        }
    }

    let _ = state_tx.send(SessionState::Disconnected);
    tracing::debug!("session loop exiting");
}

/// Establish a single WebSocket connection and pump frames both ways
/// until it drops.
///
/// On connect, a `request_state` frame is sent so the appliance pushes a
/// full snapshot of every slice before streaming deltas.
async fn connect_and_pump(
    url: &Url,
    frame_tx: &broadcast::Sender<Arc<Frame>>,
    outbound_rx: &mut mpsc::Receiver<String>,
    state_tx: &watch::Sender<SessionState>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to appliance");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("appliance connected");
    let _ = state_tx.send(SessionState::Connected);

    let (mut write, mut read) = ws_stream.split();

    write
        .send(tungstenite::Message::text(OutboundCommand::request_state()))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    // Drain any commands queued during a previous Connected window: they
    // were accepted against a connection that no longer exists.
    while outbound_rx.try_recv().is_ok() {}

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            outbound = outbound_rx.recv() => {
                let Some(text) = outbound else { return Ok(()) };
                write
                    .send(tungstenite::Message::text(text))
                    .await
                    .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
            }
            inbound = read.next() => {
                match inbound {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        decode_and_broadcast(&text, frame_tx);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite answers pongs automatically
                        tracing::trace!("websocket ping");
                    }
                    Some(Ok(tungstenite::Message::Close(close))) => {
                        if let Some(ref cf) = close {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "close frame received"
                            );
                        } else {
                            tracing::info!("close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        // Stream ended without a close frame
                        tracing::info!("websocket stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame — ignore
                    }
                }
            }
        }
    }
}

/// Decode a text frame and broadcast it. Malformed frames are logged and
/// dropped; they must never tear down the connection.
fn decode_and_broadcast(text: &str, frame_tx: &broadcast::Sender<Arc<Frame>>) {
    match Frame::decode(text) {
        Ok(frame) => {
            // Send errors just mean no active subscribers right now.
            let _ = frame_tx.send(Arc::new(frame));
        }
        Err(e) => {
            tracing::debug!(error = %e, "dropping undecodable frame");
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Reconnect delay for the given attempt: the initial delay doubled per
/// attempt, capped at `max_delay`, then spread by up to +-25% so a fleet
/// of clients does not hammer a recovering appliance in lockstep.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let capped = (config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent))
        .min(config.max_delay.as_secs_f64());

    // The spread only has to differ between clients that started their
    // attempts at different times; deriving it from the attempt number
    // keeps the delay sequence reproducible in tests.
    let spread = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    Duration::from_secs_f64((capped * spread).max(0.0))
}

// ── Tests ────────────────────────────────────────────────────────────
