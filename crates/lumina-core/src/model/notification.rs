//! Notifications delivered directly to one user, never broadcast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification as it appears in a recipient's tray.
///
/// The recipient is implicit in the delivery (the `notification:new` event
/// is addressed to one user id) and is deliberately not part of the payload.
/// Notifications are ephemeral relative to the board: they never affect
/// task or project state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Opaque stable identifier.
    pub id: String,
    /// Short headline, e.g. "Task assigned to you".
    pub title: String,
    /// Longer message body.
    pub message: String,
    /// Read flag, mutable only by the recipient.
    pub read: bool,
    /// Server-side emission time.
    pub timestamp: DateTime<Utc>,
}
