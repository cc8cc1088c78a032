//! Identifier types shared across the upstream models and the party engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream account identifier (32-bit Steam account id).
pub type AccountId = u32;

/// Upstream match identifier.
pub type MatchId = u64;

/// Upstream hero identifier.
pub type HeroId = u32;

/// Canonical identity of a party cohort.
///
/// Derived from the *set* of teammate account ids: ids are sorted ascending
/// and joined with `,`, so the same teammates in any order map to the same
/// key. An empty set maps to [`PartyId::SOLO`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyId(String);

impl PartyId {
    /// Reserved key for matches without identified teammates.
    pub const SOLO_KEY: &'static str = "SOLO";

    /// The solo cohort.
    pub fn solo() -> Self {
        Self(Self::SOLO_KEY.to_string())
    }

    /// Build the canonical key for a set of teammate ids.
    ///
    /// Returns the key together with the sorted ids.
    pub fn from_members(ids: impl IntoIterator<Item = AccountId>) -> (Self, Vec<AccountId>) {
        let mut sorted: Vec<AccountId> = ids.into_iter().collect();
        sorted.sort_unstable();

        if sorted.is_empty() {
            return (Self::solo(), sorted);
        }

        let key = sorted
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        (Self(key), sorted)
    }

    /// Whether this is the solo cohort.
    pub fn is_solo(&self) -> bool {
        self.0 == Self::SOLO_KEY
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartyId({})", self.0)
    }
}

impl From<&str> for PartyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_id_sorted_key() {
        let (id, members) = PartyId::from_members([30, 10, 20]);
        assert_eq!(id.as_str(), "10,20,30");
        assert_eq!(members, vec![10, 20, 30]);
    }

    #[test]
    fn test_party_id_order_insensitive() {
        let (a, _) = PartyId::from_members([5, 1, 4, 2, 3]);
        let (b, _) = PartyId::from_members([3, 2, 1, 5, 4]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_party_id_numeric_sort() {
        // 9 sorts before 10 numerically, not lexically
        let (id, _) = PartyId::from_members([10, 9]);
        assert_eq!(id.as_str(), "9,10");
    }

    #[test]
    fn test_party_id_empty_is_solo() {
        let (id, members) = PartyId::from_members(Vec::new());
        assert!(id.is_solo());
        assert_eq!(id, PartyId::solo());
        assert!(members.is_empty());
    }

    #[test]
    fn test_party_id_display_and_debug() {
        let id = PartyId::from("1,2");
        assert_eq!(format!("{}", id), "1,2");
        assert!(format!("{:?}", id).contains("1,2"));
        assert!(!id.is_solo());
    }

    #[test]
    fn test_party_id_serialization() {
        let (id, _) = PartyId::from_members([7, 3]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"3,7\"");
        let parsed: PartyId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
