//! Identifier types for charges and billers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// A charge identifier using ULID for time-ordering.
///
/// Charge IDs are assigned by the store on creation. Because ULIDs sort by
/// creation time, store backends that iterate keys in order return the queue
/// oldest-first without a secondary index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChargeId(Ulid);

impl ChargeId {
    /// Create a new `ChargeId` from a ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Generate a new `ChargeId` with the current timestamp.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Return the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> &Ulid {
        &self.0
    }

    /// Return the bytes of the ULID (16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// Create a `ChargeId` from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Ulid::from_bytes(bytes))
    }
}

impl FromStr for ChargeId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
        Ok(Self(ulid))
    }
}

impl fmt::Debug for ChargeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChargeId({})", self.0)
    }
}

impl fmt::Display for ChargeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ChargeId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChargeId> for String {
    fn from(id: ChargeId) -> Self {
        id.0.to_string()
    }
}

/// Identifier of the party being charged (a cyclist).
///
/// Biller IDs belong to the rental platform's identity system; this service
/// never allocates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillerId(i64);

impl BillerId {
    /// Wrap a raw biller ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the raw ID.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for BillerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BillerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_id_parses_its_display_form() {
        let id = ChargeId::generate();
        let parsed = ChargeId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn charge_id_rejects_garbage() {
        assert_eq!(ChargeId::from_str("not-a-ulid"), Err(IdError::InvalidUlid));
    }

    #[test]
    fn charge_id_serializes_as_string() {
        let id = ChargeId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn charge_ids_sort_by_creation() {
        let first = ChargeId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = ChargeId::generate();
        assert!(first < second);
    }

    #[test]
    fn biller_id_is_a_plain_number_on_the_wire() {
        let json = serde_json::to_string(&BillerId::new(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: BillerId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.get(), 42);
    }
}
