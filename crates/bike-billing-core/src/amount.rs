//! Monetary amounts.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BillingError;

/// Largest amount a single charge may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 0);

/// Decimal places the currency supports (cents).
pub const CURRENCY_SCALE: u32 = 2;

/// A positive charge amount, exactly representable in cents.
///
/// Construction rejects zero, negative values, values above [`MAX_AMOUNT`] and
/// anything with more than two significant decimal places. On the wire it is a
/// JSON number (`49.9`), matching what the rental platform sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Validate and wrap a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidAmount` if the value is not positive, is too
    /// large, or has sub-cent precision.
    pub fn new(value: Decimal) -> Result<Self, BillingError> {
        if value <= Decimal::ZERO {
            return Err(BillingError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )));
        }
        if value > MAX_AMOUNT {
            return Err(BillingError::InvalidAmount(format!(
                "amount must not exceed {MAX_AMOUNT}, got {value}"
            )));
        }
        let normalized = value.normalize();
        if normalized.scale() > CURRENCY_SCALE {
            return Err(BillingError::InvalidAmount(format!(
                "amount must be a multiple of 0.01, got {value}"
            )));
        }
        Ok(Self(normalized))
    }

    /// Build an amount from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Amount::new`].
    pub fn from_cents(cents: i64) -> Result<Self, BillingError> {
        Self::new(Decimal::new(cents, CURRENCY_SCALE))
    }

    /// The decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// The amount in cents, as sent to the gateway.
    #[must_use]
    pub fn to_cents(&self) -> i64 {
        // Bounded by MAX_AMOUNT, so the conversion cannot overflow.
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = BillingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Amount {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| BillingError::InvalidAmount(format!("not a number: {s}")))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_to_cents() {
        assert_eq!(Amount::new(dec!(49.90)).unwrap().to_cents(), 4990);
        assert_eq!(Amount::new(dec!(75)).unwrap().to_cents(), 7500);
        assert_eq!(Amount::new(dec!(0.01)).unwrap().to_cents(), 1);
    }

    #[test]
    fn rejects_non_positive() {
        assert!(Amount::new(Decimal::ZERO).is_err());
        assert!(Amount::new(dec!(-1.50)).is_err());
    }

    #[test]
    fn rejects_sub_cent_precision() {
        assert!(Amount::new(dec!(10.005)).is_err());
        // Trailing zeros are not precision.
        assert!(Amount::new(dec!(10.500)).is_ok());
    }

    #[test]
    fn rejects_above_max() {
        assert!(Amount::new(MAX_AMOUNT + dec!(1)).is_err());
        assert!(Amount::new(MAX_AMOUNT).is_ok());
    }

    #[test]
    fn from_cents_matches_decimal() {
        assert_eq!(
            Amount::from_cents(4990).unwrap(),
            Amount::new(dec!(49.9)).unwrap()
        );
    }

    #[test]
    fn json_is_a_number() {
        let amount = Amount::new(dec!(49.90)).unwrap();
        let json = serde_json::to_value(amount).unwrap();
        assert!(json.is_number());

        let parsed: Amount = serde_json::from_str("75.0").unwrap();
        assert_eq!(parsed.to_cents(), 7500);
    }

    #[test]
    fn json_rejects_invalid_values() {
        assert!(serde_json::from_str::<Amount>("0").is_err());
        assert!(serde_json::from_str::<Amount>("-3.2").is_err());
        assert!(serde_json::from_str::<Amount>("1.234").is_err());
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Amount::new(dec!(49.9)).unwrap().to_string(), "49.90");
    }
}
