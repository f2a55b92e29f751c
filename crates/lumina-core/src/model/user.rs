//! User identity, issued by the authentication collaborator.

use serde::{Deserialize, Serialize};

/// A signed-in user. Immutable once issued; other entities reference users
/// by `id` and never own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar image reference.
    pub avatar: String,
}
