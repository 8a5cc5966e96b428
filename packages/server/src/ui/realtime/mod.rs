//! Realtime relay: rooms of live WebSocket connections keyed by tip id.
//!
//! ```text
//! upgrade ──► Hub::join_room ──► Room ◄── Dispatcher::handle ◄── inbound loop
//!                                 │
//!                                 └─ broadcast ──► Connection queue ──► outbound loop
//! ```
//!
//! Each [`Connection`] runs two tasks: an inbound loop feeding frames to a
//! [`FrameHandler`] and an outbound loop draining a bounded queue into the
//! socket. Fan-out is best effort: a full queue drops the frame for that
//! connection only.

pub mod connection;
pub mod dispatcher;
pub mod hub;
pub mod room;

use std::time::Duration;

use thiserror::Error;

use crate::usecase::MessageUseCaseError;

pub use connection::{Connection, ConnectionId, FrameHandler, SocketWriter, serve};
pub use dispatcher::Dispatcher;
pub use hub::Hub;
pub use room::Room;

/// Default outbound queue capacity per connection
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// Default room idle threshold
pub const DEFAULT_ROOM_IDLE_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// Default interval between hub sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Tuning knobs for the realtime relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub outbound_capacity: usize,
    pub room_idle_threshold: Duration,
    pub sweep_interval: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            room_idle_threshold: DEFAULT_ROOM_IDLE_THRESHOLD,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// Socket-level failure. Ends the affected connection only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to read from socket: {0}")]
    Read(String),

    #[error("failed to write to socket: {0}")]
    Write(String),
}

/// Why an inbound frame was dropped without a broadcast.
///
/// Only ever logged; the requesting client gets no reply.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("frame targets tip '{frame}' but connection is bound to '{bound}'")]
    RoomMismatch { frame: String, bound: String },

    #[error(transparent)]
    UseCase(#[from] MessageUseCaseError),

    #[error("connection closed before the request completed")]
    Cancelled,

    #[error("failed to encode broadcast frame: {0}")]
    Encode(#[source] serde_json::Error),
}
