//! Credit-card field validation.
//!
//! This is pure input validation performed before a card is registered with the
//! rental platform. It checks the shape of the fields (Luhn checksum, CVV length,
//! expiry date) and nothing about issuers or card networks.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Card fields as submitted by a cyclist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetails {
    /// Name printed on the card.
    pub holder_name: String,
    /// Card number; spaces are ignored.
    pub number: String,
    /// Expiry as `MM/YY`, `MM/YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub expiry: String,
    /// Security code.
    pub cvv: String,
}

/// Card fields after validation, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    /// Trimmed holder name.
    pub holder_name: String,
    /// Digits only.
    pub number: String,
    /// Expiry year.
    pub expiry_year: i32,
    /// Expiry month (1-12).
    pub expiry_month: u32,
}

impl ValidatedCard {
    /// Last four digits, for logs and receipts.
    #[must_use]
    pub fn last4(&self) -> &str {
        &self.number[self.number.len().saturating_sub(4)..]
    }
}

/// Reasons a card is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    /// Holder name is blank.
    #[error("holder name must not be empty")]
    HolderEmpty,

    /// Number is malformed or fails the checksum.
    #[error("card number is invalid: {0}")]
    NumberInvalid(&'static str),

    /// CVV is malformed.
    #[error("cvv is invalid: {0}")]
    CvvInvalid(&'static str),

    /// Expiry cannot be parsed or is in the past.
    #[error("expiry is invalid: {0}")]
    ExpiryInvalid(&'static str),
}

impl CardError {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::HolderEmpty => "holder_empty",
            Self::NumberInvalid(_) => "number_invalid",
            Self::CvvInvalid(_) => "cvv_invalid",
            Self::ExpiryInvalid(_) => "expiry_invalid",
        }
    }
}

impl CardDetails {
    /// Validate every field against the given date.
    ///
    /// # Errors
    ///
    /// Returns the first failing field's `CardError`.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedCard, CardError> {
        let holder_name = self.holder_name.trim();
        if holder_name.is_empty() {
            return Err(CardError::HolderEmpty);
        }

        let number = validate_number(&self.number)?;
        validate_cvv(&self.cvv)?;
        let (expiry_year, expiry_month) = parse_expiry(&self.expiry)?;

        if (expiry_year, expiry_month) < (today.year(), today.month()) {
            return Err(CardError::ExpiryInvalid("card has expired"));
        }

        Ok(ValidatedCard {
            holder_name: holder_name.to_string(),
            number,
            expiry_year,
            expiry_month,
        })
    }
}

fn validate_number(raw: &str) -> Result<String, CardError> {
    let number: String = raw.chars().filter(|c| *c != ' ').collect();
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::NumberInvalid("must contain only digits"));
    }
    if number.bytes().all(|b| b == b'0') {
        return Err(CardError::NumberInvalid("must not be all zeros"));
    }
    if !luhn_valid(&number) {
        return Err(CardError::NumberInvalid("checksum mismatch"));
    }
    Ok(number)
}

fn validate_cvv(raw: &str) -> Result<(), CardError> {
    let cvv = raw.trim();
    if cvv.is_empty() {
        return Err(CardError::CvvInvalid("must not be empty"));
    }
    if !cvv.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::CvvInvalid("must contain only digits"));
    }
    if !(3..=4).contains(&cvv.len()) {
        return Err(CardError::CvvInvalid("must have 3 or 4 digits"));
    }
    Ok(())
}

/// Luhn checksum over an all-digit string.
#[must_use]
pub fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

fn parse_expiry(raw: &str) -> Result<(i32, u32), CardError> {
    let raw = raw.trim();

    let (year, month) = if let Some((month, year)) = raw.split_once('/') {
        let month: u32 = month
            .trim()
            .parse()
            .map_err(|_| CardError::ExpiryInvalid("month is not a number"))?;
        let year = year.trim();
        let parsed: i32 = year
            .parse()
            .map_err(|_| CardError::ExpiryInvalid("year is not a number"))?;
        let year = match year.len() {
            2 => 2000 + parsed,
            4 => parsed,
            _ => return Err(CardError::ExpiryInvalid("year must have 2 or 4 digits")),
        };
        (year, month)
    } else {
        let mut parts = raw.split('-');
        let year = parts
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or(CardError::ExpiryInvalid("unrecognized format"))?;
        let month = parts
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or(CardError::ExpiryInvalid("unrecognized format"))?;
        (year, month)
    };

    if !(1..=12).contains(&month) {
        return Err(CardError::ExpiryInvalid("month out of range"));
    }
    Ok((year, month))
}
