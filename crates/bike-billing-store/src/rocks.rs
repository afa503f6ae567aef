//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use bike_billing_core::{Amount, BillerId, Charge, ChargeId, ChargeStatus};
use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{ChargeIdGenerator, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    ids: ChargeIdGenerator,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            ids: ChargeIdGenerator::default(),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Collect every key in a column family.
    fn all_keys(&self, cf_name: &str) -> Result<Vec<Box<[u8]>>> {
        let cf = self.cf(cf_name)?;
        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|item| {
                item.map(|(key, _)| key)
                    .map_err(|e| StoreError::Database(e.to_string()))
            })
            .collect()
    }
}

impl Store for RocksStore {
    fn create_charge(
        &self,
        biller_id: BillerId,
        amount: Amount,
        requested_at: DateTime<Utc>,
    ) -> Result<Charge> {
        let charge = Charge::pending(self.ids.next()?, biller_id, amount, requested_at);

        let cf_charges = self.cf(cf::CHARGES)?;
        let cf_by_status = self.cf(cf::CHARGES_BY_STATUS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_charges,
            keys::charge_key(&charge.id),
            Self::serialize(&charge)?,
        );
        batch.put_cf(
            &cf_by_status,
            keys::status_index_key(charge.status, &charge.id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(charge_id = %charge.id, "Charge created");
        Ok(charge)
    }

    fn get_charge(&self, charge_id: &ChargeId) -> Result<Option<Charge>> {
        let cf = self.cf(cf::CHARGES)?;

        self.db
            .get_cf(&cf, keys::charge_key(charge_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_charges_by_status(&self, status: ChargeStatus) -> Result<Vec<Charge>> {
        let cf_by_status = self.cf(cf::CHARGES_BY_STATUS)?;
        let prefix = keys::status_prefix(status);

        let iter = self
            .db
            .iterator_cf(&cf_by_status, IteratorMode::From(&prefix, Direction::Forward));

        let mut charges = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let Some(charge_id) = keys::extract_charge_id_from_status_key(&key) else {
                tracing::warn!(key_len = key.len(), "Skipping malformed status index key");
                continue;
            };

            // The index may briefly point at a charge whose status moved on.
            if let Some(charge) = self.get_charge(&charge_id)? {
                if charge.status == status {
                    charges.push(charge);
                }
            }
        }

        Ok(charges)
    }

    fn save_charge(&self, charge: &Charge) -> Result<Charge> {
        let cf_charges = self.cf(cf::CHARGES)?;
        let cf_by_status = self.cf(cf::CHARGES_BY_STATUS)?;

        let mut batch = WriteBatch::default();

        if let Some(previous) = self.get_charge(&charge.id)? {
            if previous.status != charge.status {
                batch.delete_cf(
                    &cf_by_status,
                    keys::status_index_key(previous.status, &charge.id),
                );
            }
        }

        batch.put_cf(
            &cf_charges,
            keys::charge_key(&charge.id),
            Self::serialize(charge)?,
        );
        batch.put_cf(
            &cf_by_status,
            keys::status_index_key(charge.status, &charge.id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(charge.clone())
    }

    fn clear_charges(&self) -> Result<usize> {
        let charge_keys = self.all_keys(cf::CHARGES)?;
        let index_keys = self.all_keys(cf::CHARGES_BY_STATUS)?;

        let cf_charges = self.cf(cf::CHARGES)?;
        let cf_by_status = self.cf(cf::CHARGES_BY_STATUS)?;

        let mut batch = WriteBatch::default();
        for key in &charge_keys {
            batch.delete_cf(&cf_charges, key);
        }
        for key in &index_keys {
            batch.delete_cf(&cf_by_status, key);
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(charge_keys.len())
    }
}
