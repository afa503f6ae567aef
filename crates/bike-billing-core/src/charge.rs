//! Charge types.
//!
//! A [`Charge`] is one monetary collection attempt against a biller. It is created
//! `Pending` and moves exactly once to `Paid` or `Failed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, BillerId, ChargeId};

/// Lifecycle status of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    /// Waiting in the queue for settlement.
    Pending,

    /// Settled successfully by the gateway.
    Paid,

    /// Settlement was attempted and failed.
    Failed,

    /// Reserved for the rental platform; no flow in this service produces it.
    Cancelled,

    /// Reserved for the rental platform; no flow in this service produces it.
    Busy,
}

impl ChargeStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Paid,
        Self::Failed,
        Self::Cancelled,
        Self::Busy,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Busy => "BUSY",
        }
    }

    /// Single-byte tag used by storage indexes.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Paid => 1,
            Self::Failed => 2,
            Self::Cancelled => 3,
            Self::Busy => 4,
        }
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a settlement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// The gateway reported success.
    Paid,
    /// Anything else: no payment method, declined, gateway down, other status.
    Failed,
}

impl From<SettlementOutcome> for ChargeStatus {
    fn from(outcome: SettlementOutcome) -> Self {
        match outcome {
            SettlementOutcome::Paid => Self::Paid,
            SettlementOutcome::Failed => Self::Failed,
        }
    }
}

/// One monetary collection attempt against a biller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Store-assigned identifier.
    pub id: ChargeId,

    /// The cyclist being charged.
    pub biller_id: BillerId,

    /// Amount to collect.
    pub amount: Amount,

    /// Current status.
    pub status: ChargeStatus,

    /// When the charge was requested. Never changes.
    pub requested_at: DateTime<Utc>,

    /// When the charge left `Pending`. Absent while pending.
    pub settled_at: Option<DateTime<Utc>>,
}

impl Charge {
    /// Create a pending charge.
    #[must_use]
    pub fn pending(
        id: ChargeId,
        biller_id: BillerId,
        amount: Amount,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            biller_id,
            amount,
            status: ChargeStatus::Pending,
            requested_at,
            settled_at: None,
        }
    }

    /// Whether the charge is still waiting in the queue.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ChargeStatus::Pending
    }

    /// Record the outcome of a settlement attempt.
    ///
    /// The settlement time is clamped so it is never earlier than `requested_at`,
    /// which can otherwise happen when clocks disagree between hosts.
    pub fn settle(&mut self, outcome: SettlementOutcome, at: DateTime<Utc>) {
        self.status = outcome.into();
        self.settled_at = Some(at.max(self.requested_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn sample() -> Charge {
        Charge::pending(
            ChargeId::generate(),
            BillerId::new(7),
            Amount::new(dec!(49.90)).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn new_charge_is_pending_without_settlement_time() {
        let charge = sample();
        assert!(charge.is_pending());
        assert!(charge.settled_at.is_none());
    }

    #[test]
    fn settle_sets_status_and_time() {
        let mut charge = sample();
        let at = charge.requested_at + Duration::seconds(5);
        charge.settle(SettlementOutcome::Paid, at);
        assert_eq!(charge.status, ChargeStatus::Paid);
        assert_eq!(charge.settled_at, Some(at));

        let mut charge = sample();
        charge.settle(SettlementOutcome::Failed, Utc::now());
        assert_eq!(charge.status, ChargeStatus::Failed);
        assert!(charge.settled_at.is_some());
    }

    #[test]
    fn settlement_time_never_precedes_request() {
        let mut charge = sample();
        let skewed = charge.requested_at - Duration::seconds(30);
        charge.settle(SettlementOutcome::Paid, skewed);
        assert_eq!(charge.settled_at, Some(charge.requested_at));
    }

    #[test]
    fn status_wire_names() {
        for status in ChargeStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn status_tags_are_distinct() {
        let mut tags: Vec<u8> = ChargeStatus::ALL.iter().map(|s| s.tag()).collect();
        tags.dedup();
        assert_eq!(tags.len(), ChargeStatus::ALL.len());
    }
}
