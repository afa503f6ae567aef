//! The billing orchestrator.
//!
//! Owns the charge lifecycle: enqueue, settle one charge on request, and work
//! through the backlog of pending charges.
//!
//! Payment-domain failures never surface as errors here. A caller-invoked
//! settlement records them as `FAILED`; a queue attempt leaves the charge
//! `PENDING` so the next run retries it.

use std::sync::Arc;

use chrono::Utc;

use bike_billing_core::{
    Amount, BillerId, BillingError, Charge, ChargeId, ChargeStatus, Result, SettlementOutcome,
};
use bike_billing_store::Store;

use super::locks::ChargeLocks;
use super::notification::{self, NotificationReport};
use super::ports::{
    ChargeGateway, GatewayCharge, GatewayError, Notifier, PaymentMethodResolver, ResolverError,
};

/// Why an attempt did not collect the money.
#[derive(Debug)]
enum AttemptFailure {
    NoPaymentMethod,
    Gateway(GatewayError),
    Status(GatewayCharge),
}

/// Coordinates the store, gateway, resolver and notifier.
pub struct BillingOrchestrator {
    store: Arc<dyn Store>,
    gateway: Arc<dyn ChargeGateway>,
    resolver: Arc<dyn PaymentMethodResolver>,
    notifier: Arc<dyn Notifier>,
    locks: ChargeLocks,
}

impl BillingOrchestrator {
    /// Create an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn ChargeGateway>,
        resolver: Arc<dyn PaymentMethodResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            gateway,
            resolver,
            notifier,
            locks: ChargeLocks::new(),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Put a new pending charge in the queue. No gateway call is made.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Storage` if the store rejects the write.
    pub fn enqueue(&self, biller_id: BillerId, amount: Amount) -> Result<Charge> {
        let charge = self.store.create_charge(biller_id, amount, Utc::now())?;

        tracing::info!(
            charge_id = %charge.id,
            biller_id = %biller_id,
            amount = %amount,
            "Charge enqueued"
        );

        Ok(charge)
    }

    /// Fetch a charge by ID.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::ChargeNotFound` if no such charge exists.
    pub fn get(&self, charge_id: &ChargeId) -> Result<Charge> {
        self.store
            .get_charge(charge_id)?
            .ok_or_else(|| BillingError::ChargeNotFound {
                charge_id: charge_id.to_string(),
            })
    }

    /// Settle one pending charge now and commit the outcome.
    ///
    /// The charge always ends `PAID` or `FAILED` with `settled_at` set, and is
    /// saved exactly once. Declines, gateway outages and missing payment methods
    /// all produce `FAILED` rather than an error.
    ///
    /// # Errors
    ///
    /// - `BillingError::ChargeNotFound` if the charge does not exist (no write).
    /// - `BillingError::ChargeAlreadySettled` if it is no longer pending (no
    ///   gateway call, no write).
    /// - `BillingError::PaymentMethod` if the biller lookup itself failed; the
    ///   charge stays pending.
    /// - `BillingError::Storage` on store failures.
    pub async fn settle(&self, charge_id: &ChargeId) -> Result<Charge> {
        let _guard = self.locks.acquire(*charge_id).await;

        let mut charge = self.get(charge_id)?;
        if !charge.is_pending() {
            return Err(BillingError::ChargeAlreadySettled {
                charge_id: charge_id.to_string(),
                status: charge.status,
            });
        }

        let outcome = match self.attempt(&charge).await? {
            Ok(gateway_charge) => {
                tracing::info!(
                    charge_id = %charge.id,
                    gateway_id = %gateway_charge.id,
                    "Charge paid"
                );
                SettlementOutcome::Paid
            }
            Err(failure) => {
                tracing::info!(charge_id = %charge.id, reason = ?failure, "Charge failed");
                SettlementOutcome::Failed
            }
        };

        charge.settle(outcome, Utc::now());
        Ok(self.store.save_charge(&charge)?)
    }

    /// Attempt a queued charge without committing failures.
    ///
    /// Returns the saved charge only when the gateway reports success. Every
    /// other result leaves the charge untouched in the store and returns
    /// `None`; errors are logged, never returned.
    pub async fn try_from_queue(&self, mut charge: Charge) -> Option<Charge> {
        let _guard = self.locks.acquire(charge.id).await;

        // A caller-invoked settle may have finished while this run waited.
        match self.store.get_charge(&charge.id) {
            Ok(Some(current)) if current.is_pending() => {}
            Ok(_) => {
                tracing::debug!(charge_id = %charge.id, "Charge left the queue - skipping");
                return None;
            }
            Err(e) => {
                tracing::warn!(charge_id = %charge.id, error = %e, "Failed to recheck charge");
                return None;
            }
        }

        match self.attempt(&charge).await {
            Ok(Ok(gateway_charge)) => {
                charge.settle(SettlementOutcome::Paid, Utc::now());
                match self.store.save_charge(&charge) {
                    Ok(saved) => {
                        tracing::info!(
                            charge_id = %saved.id,
                            gateway_id = %gateway_charge.id,
                            "Queued charge paid"
                        );
                        Some(saved)
                    }
                    Err(e) => {
                        tracing::error!(
                            charge_id = %charge.id,
                            gateway_id = %gateway_charge.id,
                            error = %e,
                            "Charge collected but could not be saved"
                        );
                        None
                    }
                }
            }
            Ok(Err(failure)) => {
                tracing::debug!(
                    charge_id = %charge.id,
                    reason = ?failure,
                    "Queued charge not collected - will retry"
                );
                None
            }
            Err(e) => {
                tracing::warn!(charge_id = %charge.id, error = %e, "Biller lookup failed");
                None
            }
        }
    }

    /// Attempt every pending charge and notify billers of the ones paid.
    ///
    /// Charges are attempted one at a time in store order. Returns the charges
    /// that became `PAID` in this run; the rest stay `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Storage` only if the pending list cannot be read.
    pub async fn process_queue(&self) -> Result<Vec<Charge>> {
        let pending = self.store.list_charges_by_status(ChargeStatus::Pending)?;
        let attempted = pending.len();

        let mut paid = Vec::new();
        for charge in pending {
            if let Some(settled) = self.try_from_queue(charge).await {
                if settled.status == ChargeStatus::Paid {
                    paid.push(settled);
                }
            }
        }

        tracing::info!(attempted, paid = paid.len(), "Queue processed");

        if !paid.is_empty() {
            let report = self.notify_paid(&paid).await;
            tracing::info!(
                sent = report.sent,
                skipped = report.skipped,
                failed = report.failed,
                "Payment notifications dispatched"
            );
        }

        Ok(paid)
    }

    /// Send payment confirmations for `charges`. Never fails.
    pub async fn notify_paid(&self, charges: &[Charge]) -> NotificationReport {
        notification::notify_paid(self.resolver.as_ref(), self.notifier.as_ref(), charges).await
    }

    /// Remove every charge (administrative reset).
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Storage` on store failures.
    pub fn restore(&self) -> Result<usize> {
        let removed = self.store.clear_charges()?;
        tracing::warn!(removed, "Charge store cleared");
        Ok(removed)
    }

    /// Resolve the payment method and call the gateway.
    ///
    /// The outer `Result` carries unexpected lookup failures; the inner one is
    /// the business outcome.
    async fn attempt(
        &self,
        charge: &Charge,
    ) -> std::result::Result<std::result::Result<GatewayCharge, AttemptFailure>, ResolverError>
    {
        let Some(payment_method) = self
            .resolver
            .resolve_payment_method(charge.biller_id)
            .await?
        else {
            return Ok(Err(AttemptFailure::NoPaymentMethod));
        };

        let outcome = match self
            .gateway
            .charge(charge.amount.to_cents(), &payment_method)
            .await
        {
            Ok(gateway_charge) if gateway_charge.succeeded() => Ok(gateway_charge),
            Ok(gateway_charge) => Err(AttemptFailure::Status(gateway_charge)),
            Err(e) => {
                tracing::warn!(charge_id = %charge.id, error = %e, "Gateway error");
                Err(AttemptFailure::Gateway(e))
            }
        };

        Ok(outcome)
    }
}
