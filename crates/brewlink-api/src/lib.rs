// brewlink-api: wire transport for BrewOS-compatible appliance controllers.
//
// Two surfaces: a persistent WebSocket session that streams telemetry
// frames and carries outbound commands, and a small REST client for the
// handful of facts the appliance only serves on request.

pub mod error;
pub mod frame;
pub mod rest;
pub mod session;

pub use error::Error;
pub use frame::{Frame, FrameKind, OutboundCommand};
pub use rest::RestClient;
pub use session::{ReconnectConfig, Session, SessionState};
