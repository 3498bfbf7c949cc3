// ── Appliance facade ──
//
// Full lifecycle management for one appliance connection: the WebSocket
// session, the frame pump, REST pollers, command dispatch, and the demo
// provider all hang off this one handle.

use std::sync::Arc;

use brewlink_api::{RestClient, Session, SessionState};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ApplianceConfig;
use crate::demo::{self, DemoSink};
use crate::dispatch::{Command, DispatchOptions, Dispatcher, Notice};
use crate::error::CoreError;
use crate::model::{ApplianceEvent, Schedule, WifiNetwork};
use crate::poll::PollHandle;
use crate::store::{Store, rules};

const EVENT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// Mirrors the transport session while live; pinned to `Connected` in
/// demo mode — demo is distinguishable only by [`ApplianceConfig::demo_mode`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
    },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl From<SessionState> for ConnectionState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Disconnected => Self::Disconnected,
            SessionState::Connecting => Self::Connecting,
            SessionState::Connected => Self::Connected,
            SessionState::Reconnecting { attempt } => Self::Reconnecting { attempt },
        }
    }
}

// ── Appliance ────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Create with [`new`](Self::new), then
/// [`connect`](Self::connect) to start background tasks; every read goes
/// through the [`Store`] and every write through [`dispatch`](Self::dispatch).
#[derive(Clone)]
pub struct Appliance {
    inner: Arc<ApplianceInner>,
}

struct ApplianceInner {
    config: ApplianceConfig,
    store: Arc<Store>,
    dispatcher: Mutex<Option<Arc<Dispatcher>>>,
    connection_state: watch::Sender<ConnectionState>,
    event_tx: broadcast::Sender<ApplianceEvent>,
    /// Scoped to one connection; replaced on every `connect`.
    cancel: Mutex<CancellationToken>,
    rest: Mutex<Option<Arc<RestClient>>>,
    session: Mutex<Option<Session>>,
    demo_schedules: Mutex<Vec<Schedule>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    pollers: Mutex<Vec<PollHandle>>,
}

impl Appliance {
    /// Create an appliance handle. Does not connect — call
    /// [`connect`](Self::connect) to start background tasks.
    pub fn new(config: ApplianceConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ApplianceInner {
                config,
                store: Arc::new(Store::new()),
                dispatcher: Mutex::new(None),
                connection_state,
                event_tx,
                cancel: Mutex::new(CancellationToken::new()),
                rest: Mutex::new(None),
                session: Mutex::new(None),
                demo_schedules: Mutex::new(Vec::new()),
                task_handles: Mutex::new(Vec::new()),
                pollers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ApplianceConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Connect to the appliance (or start the demo provider).
    ///
    /// Live mode spawns the WebSocket session, the frame pump, a state
    /// mirror, and the REST pollers. Demo mode seeds the store and
    /// spawns the local feed instead; no network traffic is generated.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let cancel = CancellationToken::new();
        {
            // A connect over a live connection supersedes it. The old
            // token is cancelled first so the previous tasks wind down
            // and a later disconnect never waits on orphans.
            let mut current = self.inner.cancel.lock().await;
            current.cancel();
            *current = cancel.clone();
        }

        if self.inner.config.demo_mode {
            self.connect_demo(&cancel).await;
            return Ok(());
        }
        self.connect_live(&cancel).await
    }

    async fn connect_demo(&self, cancel: &CancellationToken) {
        demo::seed(&self.inner.store);

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&self.inner.store),
            Arc::new(DemoSink),
        ));
        *self.inner.dispatcher.lock().await = Some(dispatcher);

        let mut handles = self.inner.task_handles.lock().await;
        handles.push(tokio::spawn(demo::feed(
            Arc::clone(&self.inner.store),
            cancel.child_token(),
        )));

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!("demo provider started");
    }

    async fn connect_live(&self, cancel: &CancellationToken) -> Result<(), CoreError> {
        let config = &self.inner.config;
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        let rest = Arc::new(RestClient::new(config.url.clone(), config.timeout)?);
        *self.inner.rest.lock().await = Some(Arc::clone(&rest));

        let ws_url = config.ws_url().map_err(brewlink_api::Error::InvalidUrl)?;
        let session = Session::connect(ws_url, config.reconnect.clone(), cancel.child_token());

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&self.inner.store),
            Arc::new(session.clone()),
        ));
        *self.inner.dispatcher.lock().await = Some(Arc::clone(&dispatcher));
        *self.inner.session.lock().await = Some(session.clone());

        let mut handles = self.inner.task_handles.lock().await;
        handles.push(tokio::spawn(pump_task(
            session.subscribe(),
            Arc::clone(&self.inner.store),
            dispatcher,
            self.inner.event_tx.clone(),
            cancel.child_token(),
        )));
        handles.push(tokio::spawn(state_mirror_task(
            session.state(),
            self.inner.connection_state.clone(),
            cancel.child_token(),
        )));
        drop(handles);

        self.spawn_pollers(&rest, cancel).await;

        info!(url = %config.url, "appliance session starting");
        Ok(())
    }

    async fn spawn_pollers(&self, rest: &Arc<RestClient>, cancel: &CancellationToken) {
        let config = &self.inner.config;
        let mut pollers = self.inner.pollers.lock().await;

        let (client, store) = (Arc::clone(rest), Arc::clone(&self.inner.store));
        pollers.push(PollHandle::spawn(
            "pairing",
            config.pairing_poll,
            cancel,
            move || {
                let (client, store) = (Arc::clone(&client), Arc::clone(&store));
                async move {
                    let doc = client.pairing_status().await?;
                    store.pairing.replace(doc.into());
                    Ok(())
                }
            },
        ));

        let (client, store) = (Arc::clone(rest), Arc::clone(&self.inner.store));
        pollers.push(PollHandle::spawn(
            "log-info",
            config.log_info_poll,
            cancel,
            move || {
                let (client, store) = (Arc::clone(&client), Arc::clone(&store));
                async move {
                    let doc = client.log_buffer_info().await?;
                    store.log_info.replace(doc.into());
                    Ok(())
                }
            },
        ));

        let (client, store) = (Arc::clone(rest), Arc::clone(&self.inner.store));
        pollers.push(PollHandle::spawn(
            "time",
            config.time_poll,
            cancel,
            move || {
                let (client, store) = (Arc::clone(&client), Arc::clone(&store));
                async move {
                    let doc = client.time_status().await?;
                    store.time.replace(doc.into());
                    Ok(())
                }
            },
        ));

        let (client, store) = (Arc::clone(rest), Arc::clone(&self.inner.store));
        pollers.push(PollHandle::spawn(
            "statistics",
            config.stats_poll,
            cancel,
            move || {
                let (client, store) = (Arc::clone(&client), Arc::clone(&store));
                async move {
                    let doc = client.extended_statistics().await?;
                    store.statistics.replace(doc.into());
                    Ok(())
                }
            },
        ));
    }

    /// Disconnect and stop every background task.
    ///
    /// Pending dispatches after this point are rejected — the
    /// connection state flips before the tasks are joined.
    pub async fn disconnect(&self) {
        self.inner.cancel.lock().await.cancel();
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);

        for poller in self.inner.pollers.lock().await.drain(..) {
            poller.stop().await;
        }
        for handle in self.inner.task_handles.lock().await.drain(..) {
            let _ = handle.await;
        }

        *self.inner.session.lock().await = None;
        *self.inner.rest.lock().await = None;
        *self.inner.dispatcher.lock().await = None;
        debug!("disconnected");
    }

    // ── Command dispatch ─────────────────────────────────────────────

    /// Dispatch a write command.
    ///
    /// Returns `true` when the command was handed to the transport (or
    /// simulated in demo mode); `false` — with no side effects — when
    /// disconnected or a precondition failed.
    pub async fn dispatch(&self, command: Command, options: DispatchOptions) -> bool {
        match self.inner.dispatcher.lock().await.as_ref() {
            Some(dispatcher) => dispatcher.dispatch(command, options),
            None => {
                warn!(cmd = command.wire_name(), "dispatch rejected: not connected");
                false
            }
        }
    }

    /// Clear the diagnostics slice. Local operation, nothing is sent.
    pub fn reset_diagnostics(&self) {
        self.inner.store.reset_diagnostics();
    }

    // ── State observation ────────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn current_connection_state(&self) -> ConnectionState {
        self.inner.connection_state.borrow().clone()
    }

    pub fn events(&self) -> broadcast::Receiver<ApplianceEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Notices raised by successful dispatches, for toast-style surfacing.
    pub async fn notices(&self) -> Option<broadcast::Receiver<Notice>> {
        self.inner
            .dispatcher
            .lock()
            .await
            .as_ref()
            .map(|d| d.subscribe_notices())
    }

    // ── Request/response operations ──────────────────────────────────

    /// Scan for visible Wi-Fi networks.
    pub async fn wifi_scan(&self) -> Result<Vec<WifiNetwork>, CoreError> {
        if self.inner.config.demo_mode {
            return Ok(vec![
                WifiNetwork {
                    ssid: "DemoNet".into(),
                    rssi: -54,
                    secure: true,
                },
                WifiNetwork {
                    ssid: "Guest".into(),
                    rssi: -71,
                    secure: false,
                },
            ]);
        }
        let docs = self.rest_client().await?.wifi_scan().await?;
        Ok(docs.into_iter().map(WifiNetwork::from).collect())
    }

    /// List power schedules.
    pub async fn schedules(&self) -> Result<Vec<Schedule>, CoreError> {
        if self.inner.config.demo_mode {
            return Ok(self.inner.demo_schedules.lock().await.clone());
        }
        let docs = self.rest_client().await?.list_schedules().await?;
        Ok(docs.into_iter().map(Schedule::from).collect())
    }

    /// Create a power schedule, returning it with its assigned id.
    pub async fn create_schedule(&self, schedule: Schedule) -> Result<Schedule, CoreError> {
        if self.inner.config.demo_mode {
            let mut schedules = self.inner.demo_schedules.lock().await;
            let mut created = schedule;
            created.id = schedules.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            schedules.push(created.clone());
            return Ok(created);
        }
        let doc = self
            .rest_client()
            .await?
            .create_schedule(&(&schedule).into())
            .await?;
        Ok(doc.into())
    }

    /// Update an existing power schedule.
    pub async fn update_schedule(&self, schedule: Schedule) -> Result<Schedule, CoreError> {
        if self.inner.config.demo_mode {
            let mut schedules = self.inner.demo_schedules.lock().await;
            match schedules.iter_mut().find(|s| s.id == schedule.id) {
                Some(existing) => {
                    *existing = schedule.clone();
                    return Ok(schedule);
                }
                None => {
                    return Err(CoreError::Appliance {
                        status: 404,
                        message: format!("no schedule with id {}", schedule.id),
                    });
                }
            }
        }
        let doc = self
            .rest_client()
            .await?
            .update_schedule(&(&schedule).into())
            .await?;
        Ok(doc.into())
    }

    /// Delete a power schedule.
    pub async fn delete_schedule(&self, id: u8) -> Result<(), CoreError> {
        if self.inner.config.demo_mode {
            self.inner.demo_schedules.lock().await.retain(|s| s.id != id);
            return Ok(());
        }
        self.rest_client().await?.delete_schedule(id).await?;
        Ok(())
    }

    async fn rest_client(&self) -> Result<Arc<RestClient>, CoreError> {
        self.inner
            .rest
            .lock()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(CoreError::Disconnected)
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Apply inbound frames to the store in arrival order, broadcast the
/// events they raise, and enforce cross-slice rules in the same turn.
async fn pump_task(
    mut frames: broadcast::Receiver<Arc<brewlink_api::Frame>>,
    store: Arc<Store>,
    dispatcher: Arc<Dispatcher>,
    event_tx: broadcast::Sender<ApplianceEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            frame = frames.recv() => {
                match frame {
                    Ok(frame) => {
                        for event in store.apply_frame(&frame) {
                            let _ = event_tx.send(event);
                        }

                        // Scale gone while brew-by-weight is on: disable
                        // locally and tell the appliance, one pump turn.
                        if let Some(disabled) = rules::bbw_requires_scale(&store) {
                            dispatcher.dispatch(
                                Command::SetBrewByWeight(disabled),
                                DispatchOptions::default(),
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "frame pump lagged; some frames were dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
    debug!("frame pump exiting");
}

/// Mirror the transport session state into the consumer-visible
/// connection state.
async fn state_mirror_task(
    mut session_state: watch::Receiver<SessionState>,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = session_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = session_state.borrow_and_update().clone();
                let _ = connection_state.send(state.into());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ScheduleAction;

    #[tokio::test]
    async fn demo_connect_seeds_and_reports_connected() {
        let appliance = Appliance::new(ApplianceConfig {
            demo_mode: true,
            ..ApplianceConfig::default()
        });
        appliance.connect().await.unwrap();

        assert!(appliance.current_connection_state().is_connected());
        assert_eq!(appliance.store().identity().device_name, "Demo Machine");

        appliance.disconnect().await;
        assert_eq!(
            appliance.current_connection_state(),
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn reconnect_supersedes_the_previous_connection() {
        let appliance = Appliance::new(ApplianceConfig {
            demo_mode: true,
            ..ApplianceConfig::default()
        });
        appliance.connect().await.unwrap();
        appliance.connect().await.unwrap();

        // The first connection's tasks must have been cancelled, or
        // this join would never complete.
        tokio::time::timeout(std::time::Duration::from_secs(5), appliance.disconnect())
            .await
            .unwrap();
        assert_eq!(
            appliance.current_connection_state(),
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn dispatch_before_connect_is_rejected() {
        let appliance = Appliance::new(ApplianceConfig::default());
        let ok = appliance
            .dispatch(Command::Tare, DispatchOptions::default())
            .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn demo_schedule_crud_is_simulated_locally() {
        let appliance = Appliance::new(ApplianceConfig {
            demo_mode: true,
            ..ApplianceConfig::default()
        });
        appliance.connect().await.unwrap();

        let created = appliance
            .create_schedule(Schedule {
                enabled: true,
                days: 0b0111_1110,
                hour: 6,
                minute: 30,
                action: ScheduleAction::TurnOn,
                name: "Morning".into(),
                ..Schedule::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let mut updated = created.clone();
        updated.minute = 45;
        appliance.update_schedule(updated.clone()).await.unwrap();
        assert_eq!(appliance.schedules().await.unwrap()[0].minute, 45);

        appliance.delete_schedule(created.id).await.unwrap();
        assert!(appliance.schedules().await.unwrap().is_empty());

        appliance.disconnect().await;
    }
}
