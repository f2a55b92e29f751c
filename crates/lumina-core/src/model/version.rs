//! Per-entity version counter used for stale-write rejection.
//!
//! Every task mutation event carries a version. The server assigns
//! [`Version::Canonical`] numbers, strictly increasing per entity.
//! Optimistic local writes are tagged [`Version::Provisional`] with a
//! client-local counter; the two number spaces are never compared against
//! each other.
//!
//! # Supersession rules
//!
//! - canonical vs canonical: strictly greater number wins (stale
//!   re-deliveries are discarded)
//! - canonical vs provisional: canonical always wins — the server is the
//!   single source of truth and client optimism is a latency hint
//! - provisional vs canonical: the provisional write wins locally, so an
//!   optimistic edit is visible immediately on top of confirmed state
//! - provisional vs provisional: strictly greater counter wins, keeping
//!   successive local edits to the same task in order

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version tag carried by every task snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "n", rename_all = "lowercase")]
pub enum Version {
    /// Client-minted, unconfirmed. Always overwritable by canonical state.
    Provisional(u64),
    /// Server-assigned, authoritative, strictly increasing per entity.
    Canonical(u64),
}

impl Version {
    /// Whether a task carrying `self` should replace one carrying `held`.
    #[must_use]
    pub const fn supersedes(self, held: Self) -> bool {
        match (self, held) {
            (Self::Canonical(new), Self::Canonical(old)) => new > old,
            (Self::Canonical(_), Self::Provisional(_)) => true,
            (Self::Provisional(_), Self::Canonical(_)) => true,
            (Self::Provisional(new), Self::Provisional(old)) => new > old,
        }
    }

    /// `true` for server-assigned versions.
    #[must_use]
    pub const fn is_canonical(self) -> bool {
        matches!(self, Self::Canonical(_))
    }

    /// The raw counter, without the provenance tag.
    #[must_use]
    pub const fn number(self) -> u64 {
        match self {
            Self::Provisional(n) | Self::Canonical(n) => n,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisional(n) => write!(f, "provisional:{n}"),
            Self::Canonical(n) => write!(f, "canonical:{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn canonical_orders_by_number() {
        assert!(Version::Canonical(2).supersedes(Version::Canonical(1)));
        assert!(!Version::Canonical(1).supersedes(Version::Canonical(2)));
        assert!(!Version::Canonical(3).supersedes(Version::Canonical(3)));
    }

    #[test]
    fn canonical_always_beats_provisional() {
        // Even a "lower" canonical number replaces an optimistic entry:
        // the number spaces are unrelated.
        assert!(Version::Canonical(1).supersedes(Version::Provisional(99)));
    }

    #[test]
    fn provisional_applies_over_canonical() {
        assert!(Version::Provisional(1).supersedes(Version::Canonical(42)));
    }

    #[test]
    fn provisional_orders_by_counter() {
        assert!(Version::Provisional(5).supersedes(Version::Provisional(4)));
        assert!(!Version::Provisional(4).supersedes(Version::Provisional(4)));
    }

    #[test]
    fn serde_roundtrip() {
        for v in [Version::Provisional(7), Version::Canonical(3)] {
            let json = serde_json::to_string(&v).expect("serialize");
            let back: Version = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(v, back);
        }
    }

    #[test]
    fn display_shows_provenance() {
        assert_eq!(Version::Canonical(3).to_string(), "canonical:3");
        assert_eq!(Version::Provisional(9).to_string(), "provisional:9");
    }
}
