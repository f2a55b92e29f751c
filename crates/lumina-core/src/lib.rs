//! Core engine for the lumina board: a client-synchronized task-state
//! engine for small creative teams.
//!
//! The pieces, leaves first:
//!
//! - [`model`] — shared entity vocabulary (users, projects, tasks,
//!   comments, notifications, versions).
//! - [`workflow`] — the task state machine: permissive four-state graph
//!   gated by project membership.
//! - [`services`] — pure entity construction and project archival.
//! - [`store`] — the single client-side source of truth, mutated only
//!   through an enumerated reducer.
//! - [`sync`] — optimistic writes reconciled against canonical server
//!   events over per-project rooms; full resync on reconnect.
//! - [`notify`] — fan-out from canonical events to per-user direct
//!   deliveries.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per module; `anyhow::Result` at
//!   binary edges only.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod notify;
pub mod services;
pub mod store;
pub mod sync;
pub mod workflow;

pub use config::SyncConfig;
pub use error::ErrorCode;
