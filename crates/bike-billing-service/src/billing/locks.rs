//! Per-charge settlement locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use bike_billing_core::ChargeId;

/// Serializes settlement attempts per charge ID.
///
/// Entries are created on demand and dropped once nobody holds or waits on
/// them, so the map only ever contains in-flight charges.
#[derive(Debug, Default)]
pub struct ChargeLocks {
    inner: Mutex<HashMap<ChargeId, Arc<AsyncMutex<()>>>>,
}

impl ChargeLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other settlement of `charge_id` is in flight.
    pub async fn acquire(&self, charge_id: ChargeId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(charge_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of charges currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_charge_waits() {
        let locks = Arc::new(ChargeLocks::new());
        let id = ChargeId::generate();

        let guard = locks.acquire(id).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_charges_do_not_block() {
        let locks = ChargeLocks::new();
        let _first = locks.acquire(ChargeId::generate()).await;
        let second = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(ChargeId::generate()),
        )
        .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = ChargeLocks::new();
        {
            let _guard = locks.acquire(ChargeId::generate()).await;
            assert_eq!(locks.tracked(), 1);
        }
        assert_eq!(locks.tracked(), 0);

        let _guard = locks.acquire(ChargeId::generate()).await;
        assert_eq!(locks.inner.lock().unwrap().len(), 1);
    }
}
