//! Best-effort payment notifications.

use bike_billing_core::Charge;

use super::ports::{Notifier, PaymentMethodResolver};

/// Subject line of the payment confirmation email.
pub const CONFIRMATION_SUBJECT: &str = "Payment confirmed";

/// Format used for the settlement time in messages.
const SETTLED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S UTC";

/// Render the confirmation body for a settled charge.
#[must_use]
pub fn confirmation_body(charge: &Charge) -> String {
    let settled_at = charge.settled_at.map_or_else(
        || "-".to_string(),
        |at| at.format(SETTLED_AT_FORMAT).to_string(),
    );

    format!(
        "Hello!\n\n\
         Your charge {id} of {amount} has been processed.\n\
         Status: {status}\n\
         Settled at: {settled_at}\n\n\
         Thank you for riding with us.",
        id = charge.id,
        amount = charge.amount,
        status = charge.status,
    )
}

/// Counts from one notification run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotificationReport {
    /// Messages handed to the notifier successfully.
    pub sent: usize,
    /// Charges whose biller has no address.
    pub skipped: usize,
    /// Charges whose lookup or delivery failed.
    pub failed: usize,
}

/// Notify the biller of each charge, one at a time.
///
/// A failure for one charge is logged and does not stop the rest.
pub async fn notify_paid(
    resolver: &dyn PaymentMethodResolver,
    notifier: &dyn Notifier,
    charges: &[Charge],
) -> NotificationReport {
    let mut report = NotificationReport::default();

    for charge in charges {
        let address = match resolver.resolve_notification_address(charge.biller_id).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                tracing::debug!(
                    charge_id = %charge.id,
                    biller_id = %charge.biller_id,
                    "No notification address - skipping"
                );
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(
                    charge_id = %charge.id,
                    biller_id = %charge.biller_id,
                    error = %e,
                    "Notification address lookup failed"
                );
                report.failed += 1;
                continue;
            }
        };

        match notifier
            .send(&address, CONFIRMATION_SUBJECT, &confirmation_body(charge))
            .await
        {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::warn!(
                    charge_id = %charge.id,
                    error = %e,
                    "Payment notification failed"
                );
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use bike_billing_core::{Amount, BillerId, ChargeId, SettlementOutcome};
    use chrono::{TimeZone, Utc};

    #[test]
    fn body_embeds_charge_fields() {
        let requested_at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut charge = Charge::pending(
            ChargeId::generate(),
            BillerId::new(7),
            Amount::from_cents(4990).unwrap(),
            requested_at,
        );
        charge.settle(
            SettlementOutcome::Paid,
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 5, 9).unwrap(),
        );

        let body = confirmation_body(&charge);
        assert!(body.contains(&charge.id.to_string()));
        assert!(body.contains("49.90"));
        assert!(body.contains("PAID"));
        assert!(body.contains("01/03/2025 10:05:09 UTC"));
    }
}
