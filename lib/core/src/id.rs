//! Identifier types for identities issued by the external identity provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Numeric identity assigned to a user by the external identity provider.
///
/// The provider reports `0` when it has no identity for the caller, so a zero
/// value is representable (it arrives over the wire) but never accepted as a
/// signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(u64);

impl ExternalId {
    /// Creates an ID from its raw numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns true if the provider did not actually identify anyone.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExternalId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self).map_err(|e| ParseIdError {
            id_type: "ExternalId",
            reason: e.to_string(),
        })
    }
}

impl From<u64> for ExternalId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_plain_number() {
        assert_eq!(ExternalId::new(4217).to_string(), "4217");
    }

    #[test]
    fn zero_is_detected() {
        assert!(ExternalId::new(0).is_zero());
        assert!(ExternalId::default().is_zero());
        assert!(!ExternalId::new(1).is_zero());
    }

    #[test]
    fn parse_round_trips_display() {
        let id = ExternalId::new(98_765);
        let parsed: ExternalId = id.to_string().parse().expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let err = "usr_abc".parse::<ExternalId>().unwrap_err();
        assert_eq!(err.id_type, "ExternalId");
    }

    #[test]
    fn deserializes_from_json_number() {
        let id: ExternalId = serde_json::from_str("42").expect("deserialize");
        assert_eq!(id.get(), 42);
    }
}
