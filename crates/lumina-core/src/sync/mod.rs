//! Client-side sync protocol layer.
//!
//! Translates local mutation intents into outbound requests, applies them
//! optimistically to the store, and reconciles canonical events arriving on
//! the project room channel and the user's direct channel.
//!
//! The layer is transport-agnostic: anything implementing [`Transport`]
//! (WebSocket + REST in production, in-memory queues in tests and the
//! simulator) can carry the protocol.
//!
//! # Reconnection policy
//!
//! On channel disconnect no writes are buffered. The store is marked stale
//! and reconnection triggers a full refetch of the active project's task
//! set, trading bandwidth for correctness: event replay across a gap would
//! need server-side history the protocol does not require.

pub mod client;
pub mod transport;

pub use client::{ConnectionState, NewTask, PumpReport, SyncClient, SyncError};
pub use transport::{BoardSnapshot, ChannelPoll, Transport};
