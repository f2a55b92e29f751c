//! Abstraction over the wire: the consumed REST surface plus the real-time
//! channel.
//!
//! Implementations shuttle requests, events, and resync snapshots between
//! one client and the server. The trait is intentionally small; batching,
//! authentication, and compression are layered underneath it.

use serde::{Deserialize, Serialize};

use crate::event::{ClientRequest, ServerEvent};
use crate::model::Task;

/// Result of draining the channel once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPoll {
    /// Events delivered since the last poll, in server order.
    pub events: Vec<ServerEvent>,
    /// Whether the channel is still up. `false` means deliveries may have
    /// been missed and the client must resync.
    pub connected: bool,
}

/// Full task set for one project, as returned by
/// `GET /api/v1/projects/:id/tasks`. The resync payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Every task of the project, with canonical versions.
    pub tasks: Vec<Task>,
}

/// One client's connection to the server.
pub trait Transport {
    /// Error type for transport operations.
    type Error: std::fmt::Debug + std::fmt::Display;

    /// Join a broadcast room (`project:{id}`).
    ///
    /// # Errors
    ///
    /// Returns the transport's error when the join cannot be delivered.
    fn join_room(&mut self, room: &str) -> Result<(), Self::Error>;

    /// Leave a broadcast room.
    ///
    /// # Errors
    ///
    /// Returns the transport's error when the leave cannot be delivered.
    fn leave_room(&mut self, room: &str) -> Result<(), Self::Error>;

    /// Send a mutation request. Fire-and-forget: confirmation arrives later
    /// as a canonical event on the channel, not as a response here.
    ///
    /// # Errors
    ///
    /// Returns the transport's error when the request cannot be sent.
    fn send(&mut self, request: ClientRequest) -> Result<(), Self::Error>;

    /// Drain pending channel events.
    ///
    /// # Errors
    ///
    /// Returns the transport's error on a channel fault that is not a plain
    /// disconnect (disconnects are reported via [`ChannelPoll::connected`]).
    fn poll(&mut self) -> Result<ChannelPoll, Self::Error>;

    /// Fetch the full task set for a project over REST. Used for initial
    /// hydration and for full resync after a disconnect.
    ///
    /// # Errors
    ///
    /// Returns the transport's error when the fetch fails.
    fn fetch_board(&mut self, project_id: &str) -> Result<BoardSnapshot, Self::Error>;
}
