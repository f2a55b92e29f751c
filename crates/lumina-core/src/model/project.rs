//! Projects: the unit of collaboration and of room scoping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project owns zero or more tasks and defines the membership set that
/// gates every task mutation. The owner is implicitly a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Opaque stable identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Exactly one owning user.
    pub owner_id: String,
    /// Member user ids. The owner need not be listed; `is_member` treats
    /// the owner as a member either way.
    pub members: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Archived projects are unavailable: their tasks become read-only.
    #[serde(default)]
    pub archived: bool,
}

impl Project {
    /// Whether `user_id` may act on this project's tasks.
    #[must_use]
    pub fn is_member(&self, user_id: &str) -> bool {
        self.owner_id == user_id || self.members.iter().any(|m| m == user_id)
    }

    /// The broadcast room name for this project's channel.
    #[must_use]
    pub fn room(&self) -> String {
        format!("project:{}", self.id)
    }
}
