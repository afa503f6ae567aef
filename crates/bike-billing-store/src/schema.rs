//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary charge records, keyed by `charge_id` (ULID).
    pub const CHARGES: &str = "charges";

    /// Index: charges by status, keyed by `status_tag || charge_id`.
    /// Value is empty (index only).
    pub const CHARGES_BY_STATUS: &str = "charges_by_status";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::CHARGES, cf::CHARGES_BY_STATUS]
}
