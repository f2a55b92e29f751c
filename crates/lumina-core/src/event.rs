//! Wire events for the real-time channel protocol.
//!
//! Server-originated events use the `scope:verb` names from the channel
//! protocol: `task:created`, `task:updated`, and `task:commented` are
//! broadcast to the project room, while `notification:new` is delivered
//! directly to exactly one user and never broadcast.
//!
//! Every payload carries the full updated entity plus its version, never a
//! diff, so a client can apply last-event-wins without needing prior state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{Notification, Task, Version};

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// The four server-originated event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A task was created. Broadcast to the project room.
    TaskCreated,
    /// A task field changed (including status). Broadcast to the room.
    TaskUpdated,
    /// A comment was appended. Broadcast to the room.
    TaskCommented,
    /// A notification for one user. Direct delivery only.
    NotificationNew,
}

impl EventKind {
    /// All event kinds in catalog order.
    pub const ALL: [Self; 4] = [
        Self::TaskCreated,
        Self::TaskUpdated,
        Self::TaskCommented,
        Self::NotificationNew,
    ];

    /// The canonical `scope:verb` channel name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task:created",
            Self::TaskUpdated => "task:updated",
            Self::TaskCommented => "task:commented",
            Self::NotificationNew => "notification:new",
        }
    }

    /// Whether this kind is broadcast to the project room.
    ///
    /// `notification:new` is the one direct-only kind.
    #[must_use]
    pub const fn is_room_broadcast(self) -> bool {
        !matches!(self, Self::NotificationNew)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event '{}': expected one of task:created, task:updated, \
             task:commented, notification:new",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventKind {}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task:created" => Ok(Self::TaskCreated),
            "task:updated" => Ok(Self::TaskUpdated),
            "task:commented" => Ok(Self::TaskCommented),
            "notification:new" => Ok(Self::NotificationNew),
            _ => Err(UnknownEventKind { raw: s.to_string() }),
        }
    }
}

// Custom serde: serialize as the `scope:verb` string.
impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// A canonical event, accepted and ordered by the server.
///
/// Within one project room, all connected clients observe these in the same
/// order. Canonical events are authoritative over any client-local
/// optimistic state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerEvent {
    /// Broadcast: a new task, canonical version assigned.
    #[serde(rename = "task:created")]
    TaskCreated(Task),
    /// Broadcast: a full task snapshot after any field change.
    #[serde(rename = "task:updated")]
    TaskUpdated(Task),
    /// Broadcast: a full task snapshot after a comment append.
    #[serde(rename = "task:commented")]
    TaskCommented(Task),
    /// Direct: a notification for the addressed user only.
    #[serde(rename = "notification:new")]
    NotificationNew(Notification),
}

impl ServerEvent {
    /// The event name this payload travels under.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TaskCreated(_) => EventKind::TaskCreated,
            Self::TaskUpdated(_) => EventKind::TaskUpdated,
            Self::TaskCommented(_) => EventKind::TaskCommented,
            Self::NotificationNew(_) => EventKind::NotificationNew,
        }
    }

    /// The task payload, for the three task-scoped kinds.
    #[must_use]
    pub const fn task(&self) -> Option<&Task> {
        match self {
            Self::TaskCreated(t) | Self::TaskUpdated(t) | Self::TaskCommented(t) => Some(t),
            Self::NotificationNew(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientRequest
// ---------------------------------------------------------------------------

/// An outbound mutation request, produced by the sync layer after local
/// validation and optimistic apply.
///
/// Requests carry the desired full task snapshot (with its provisional
/// version) plus the acting user, so the server can re-validate membership
/// before assigning a canonical version and re-broadcasting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ClientRequest {
    /// `POST /api/v1/tasks`
    CreateTask {
        /// Acting user id.
        actor: String,
        /// The new task as the client sees it.
        task: Task,
    },
    /// `PATCH /api/v1/tasks/:id` — status, priority, or assignee change.
    UpdateTask {
        /// Acting user id.
        actor: String,
        /// The desired task snapshot.
        task: Task,
    },
    /// `PATCH /api/v1/tasks/:id` — comment append.
    CommentTask {
        /// Acting user id.
        actor: String,
        /// The task snapshot including the appended comment.
        task: Task,
    },
}

impl ClientRequest {
    /// The task snapshot this request carries.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::CreateTask { task, .. }
            | Self::UpdateTask { task, .. }
            | Self::CommentTask { task, .. } => task,
        }
    }

    /// The acting user id.
    #[must_use]
    pub fn actor(&self) -> &str {
        match self {
            Self::CreateTask { actor, .. }
            | Self::UpdateTask { actor, .. }
            | Self::CommentTask { actor, .. } => actor,
        }
    }
}

// ---------------------------------------------------------------------------
// EventDescriptor
// ---------------------------------------------------------------------------

/// Which entity family a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Task,
    Project,
}

/// What a successful operation did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Created,
    Updated,
    Commented,
}

/// Descriptor produced alongside every successful workflow or service
/// operation. The sync layer maps descriptors to wire events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    /// Entity family.
    pub entity: EntityKind,
    /// Entity id.
    pub id: String,
    /// What happened.
    pub kind: MutationKind,
    /// The version of the produced snapshot.
    pub version: Version,
}
