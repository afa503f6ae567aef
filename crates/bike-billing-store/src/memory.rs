//! In-memory storage implementation.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bike_billing_core::{Amount, BillerId, Charge, ChargeId, ChargeStatus};
use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};
use crate::{ChargeIdGenerator, Store};

/// A thread-safe in-memory charge store.
///
/// Charges are kept in a `BTreeMap` keyed by ID, so listings come back in
/// creation order. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    charges: RwLock<BTreeMap<ChargeId, Charge>>,
    ids: ChargeIdGenerator,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ChargeId, Charge>>> {
        self.charges
            .read()
            .map_err(|_| StoreError::Database("charge map lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ChargeId, Charge>>> {
        self.charges
            .write()
            .map_err(|_| StoreError::Database("charge map lock poisoned".into()))
    }
}

impl Store for MemoryStore {
    fn create_charge(
        &self,
        biller_id: BillerId,
        amount: Amount,
        requested_at: DateTime<Utc>,
    ) -> Result<Charge> {
        let charge = Charge::pending(self.ids.next()?, biller_id, amount, requested_at);
        self.write()?.insert(charge.id, charge.clone());
        Ok(charge)
    }

    fn get_charge(&self, charge_id: &ChargeId) -> Result<Option<Charge>> {
        Ok(self.read()?.get(charge_id).cloned())
    }

    fn list_charges_by_status(&self, status: ChargeStatus) -> Result<Vec<Charge>> {
        Ok(self
            .read()?
            .values()
            .filter(|c| c.status == status)
            .cloned()
            .collect())
    }

    fn save_charge(&self, charge: &Charge) -> Result<Charge> {
        self.write()?.insert(charge.id, charge.clone());
        Ok(charge.clone())
    }

    fn clear_charges(&self) -> Result<usize> {
        let mut charges = self.write()?;
        let removed = charges.len();
        charges.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bike_billing_core::SettlementOutcome;

    fn amount(cents: i64) -> Amount {
        Amount::from_cents(cents).unwrap()
    }

    #[test]
    fn create_assigns_id_and_pending_status() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let charge = store.create_charge(BillerId::new(7), amount(4990), now).unwrap();

        assert_eq!(charge.status, ChargeStatus::Pending);
        assert_eq!(charge.requested_at, now);
        assert!(charge.settled_at.is_none());
        assert_eq!(store.get_charge(&charge.id).unwrap(), Some(charge));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get_charge(&ChargeId::generate()).unwrap().is_none());
    }

    #[test]
    fn list_by_status_is_in_creation_order() {
        let store = MemoryStore::new();
        let ids: Vec<_> = (1..=5)
            .map(|i| {
                store
                    .create_charge(BillerId::new(i), amount(100 * i), Utc::now())
                    .unwrap()
                    .id
            })
            .collect();

        let listed: Vec<_> = store
            .list_charges_by_status(ChargeStatus::Pending)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn save_moves_charge_between_statuses() {
        let store = MemoryStore::new();
        let mut charge = store
            .create_charge(BillerId::new(1), amount(500), Utc::now())
            .unwrap();
        charge.settle(SettlementOutcome::Paid, Utc::now());

        let saved = store.save_charge(&charge).unwrap();
        assert_eq!(saved, charge);
        assert!(store
            .list_charges_by_status(ChargeStatus::Pending)
            .unwrap()
            .is_empty());
        assert_eq!(
            store.list_charges_by_status(ChargeStatus::Paid).unwrap(),
            vec![charge]
        );
    }

    #[test]
    fn clear_removes_everything() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store
                .create_charge(BillerId::new(i), amount(100), Utc::now())
                .unwrap();
        }
        assert_eq!(store.clear_charges().unwrap(), 3);
        assert!(store
            .list_charges_by_status(ChargeStatus::Pending)
            .unwrap()
            .is_empty());
    }
}
