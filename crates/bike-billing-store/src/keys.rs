//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in column families.

use bike_billing_core::{ChargeId, ChargeStatus};

/// Create a charge key from a charge ID.
#[must_use]
pub fn charge_key(charge_id: &ChargeId) -> Vec<u8> {
    charge_id.to_bytes().to_vec()
}

/// Create a status index key.
///
/// Format: `status_tag (1 byte) || charge_id (16 bytes)`
///
/// Since ULIDs are time-ordered, charges with the same status sort by creation time.
#[must_use]
pub fn status_index_key(status: ChargeStatus, charge_id: &ChargeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(17);
    key.push(status.tag());
    key.extend_from_slice(&charge_id.to_bytes());
    key
}

/// Create a prefix for iterating all charges with a status.
#[must_use]
pub fn status_prefix(status: ChargeStatus) -> Vec<u8> {
    vec![status.tag()]
}

/// Extract the charge ID from a status index key.
///
/// Returns `None` if the key is not exactly 17 bytes.
#[must_use]
pub fn extract_charge_id_from_status_key(key: &[u8]) -> Option<ChargeId> {
    let bytes: [u8; 16] = key.get(1..)?.try_into().ok()?;
    Some(ChargeId::from_bytes(bytes))
}
