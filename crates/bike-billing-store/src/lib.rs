//! Charge storage for the bike-rental billing service.
//!
//! This crate is the persistence boundary for charges. The billing orchestrator
//! talks to it only through the [`Store`] trait.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, ordered by charge ID. The default.
//! - `RocksStore`: `RocksDB` with column families and CBOR values, behind the
//!   `rocksdb-backend` feature.
//!
//! # Example
//!
//! ```
//! use bike_billing_core::{Amount, BillerId, ChargeStatus};
//! use bike_billing_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let charge = store
//!     .create_charge(BillerId::new(7), Amount::from_cents(4990).unwrap(), chrono::Utc::now())
//!     .unwrap();
//!
//! let pending = store.list_charges_by_status(ChargeStatus::Pending).unwrap();
//! assert_eq!(pending, vec![charge]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;

#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use std::sync::Mutex;

use bike_billing_core::{Amount, BillerId, Charge, ChargeId, ChargeStatus};
use chrono::{DateTime, Utc};

/// The storage trait defining all charge operations.
///
/// Every method is a single durable operation; there are no multi-charge
/// transactions. Callers that need "one settlement at a time per charge"
/// serialize above this layer.
pub trait Store: Send + Sync {
    /// Create a pending charge and assign its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn create_charge(
        &self,
        biller_id: BillerId,
        amount: Amount,
        requested_at: DateTime<Utc>,
    ) -> Result<Charge>;

    /// Get a charge by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_charge(&self, charge_id: &ChargeId) -> Result<Option<Charge>>;

    /// List every charge currently in `status`, oldest first.
    ///
    /// The result is a snapshot: charges created afterwards are not included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_charges_by_status(&self, status: ChargeStatus) -> Result<Vec<Charge>>;

    /// Insert or update a charge and return the persisted value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn save_charge(&self, charge: &Charge) -> Result<Charge>;

    /// Delete every charge. Returns how many were removed.
    ///
    /// This is an administrative reset, not part of any billing flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn clear_charges(&self) -> Result<usize>;
}

/// Monotonic charge ID source shared by the backends.
///
/// IDs generated within the same millisecond still sort in creation order, so
/// backends that iterate by key return the queue first-in first-out.
pub(crate) struct ChargeIdGenerator(Mutex<ulid::Generator>);

impl Default for ChargeIdGenerator {
    fn default() -> Self {
        Self(Mutex::new(ulid::Generator::new()))
    }
}

impl ChargeIdGenerator {
    pub(crate) fn next(&self) -> Result<ChargeId> {
        let mut generator = self
            .0
            .lock()
            .map_err(|_| StoreError::Database("id generator lock poisoned".into()))?;
        generator
            .generate()
            .map(ChargeId::from_ulid)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
