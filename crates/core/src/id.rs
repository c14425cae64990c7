//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a production unit (pond).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PondId(Uuid);

impl PondId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PondId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PondId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PondId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<PondId> for Uuid {
    fn from(value: PondId) -> Self {
        value.0
    }
}

impl FromStr for PondId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("PondId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Join key between a production unit and its ledger transactions.
///
/// Opaque to this crate: the ledger boundary decides its format. Leading and
/// trailing whitespace is not significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerLinkId(String);

impl LedgerLinkId {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("LedgerLinkId: must not be blank"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LedgerLinkId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LedgerLinkId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pond_id_round_trips_through_display() {
        let id = PondId::new();
        let parsed: PondId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn pond_id_rejects_garbage() {
        let err = "not-a-uuid".parse::<PondId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.starts_with("PondId")));
    }

    #[test]
    fn ledger_link_is_trimmed_and_non_blank() {
        assert_eq!(LedgerLinkId::new("  acct-7 ").unwrap().as_str(), "acct-7");
        assert!(LedgerLinkId::new("   ").is_err());
    }
}
