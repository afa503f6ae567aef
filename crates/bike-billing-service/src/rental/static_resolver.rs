//! Resolver backed by a fixed biller table.

use std::collections::HashMap;

use async_trait::async_trait;

use bike_billing_core::BillerId;

use crate::billing::{PaymentMethodResolver, ResolverError};

/// Error parsing a biller table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StaticResolverError {
    /// An entry is not of the form `<biller id>=<value>`.
    #[error("invalid biller entry: {0:?}")]
    InvalidEntry(String),
}

/// Answers lookups from in-memory tables.
///
/// Billers missing from a table have no payment method or no address.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    payment_methods: HashMap<BillerId, String>,
    addresses: HashMap<BillerId, String>,
}

impl StaticResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payment method for `biller_id`.
    #[must_use]
    pub fn with_payment_method(mut self, biller_id: BillerId, method: impl Into<String>) -> Self {
        self.payment_methods.insert(biller_id, method.into());
        self
    }

    /// Register a notification address for `biller_id`.
    #[must_use]
    pub fn with_address(mut self, biller_id: BillerId, address: impl Into<String>) -> Self {
        self.addresses.insert(biller_id, address.into());
        self
    }

    /// Build from comma-separated `id=value` lists, e.g.
    /// `"7=pm_card_visa,8=pm_card_mastercard"`.
    ///
    /// # Errors
    ///
    /// Returns `StaticResolverError::InvalidEntry` for the first malformed entry.
    pub fn parse(payment_methods: &str, addresses: &str) -> Result<Self, StaticResolverError> {
        Ok(Self {
            payment_methods: parse_table(payment_methods)?,
            addresses: parse_table(addresses)?,
        })
    }

    /// Number of billers with a payment method.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payment_methods.len()
    }

    /// Whether no biller has a payment method.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payment_methods.is_empty()
    }
}

fn parse_table(raw: &str) -> Result<HashMap<BillerId, String>, StaticResolverError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, value) = entry
                .split_once('=')
                .ok_or_else(|| StaticResolverError::InvalidEntry(entry.to_string()))?;
            let id: i64 = id
                .trim()
                .parse()
                .map_err(|_| StaticResolverError::InvalidEntry(entry.to_string()))?;
            let value = value.trim();
            if value.is_empty() {
                return Err(StaticResolverError::InvalidEntry(entry.to_string()));
            }
            Ok((BillerId::new(id), value.to_string()))
        })
        .collect()
}

#[async_trait]
impl PaymentMethodResolver for StaticResolver {
    async fn resolve_payment_method(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError> {
        Ok(self.payment_methods.get(&biller_id).cloned())
    }

    async fn resolve_notification_address(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError> {
        Ok(self.addresses.get(&biller_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_lookups() {
        let resolver = StaticResolver::new()
            .with_payment_method(BillerId::new(7), "pm_card_visa")
            .with_address(BillerId::new(7), "ana@example.com");

        assert_eq!(
            resolver
                .resolve_payment_method(BillerId::new(7))
                .await
                .unwrap()
                .as_deref(),
            Some("pm_card_visa")
        );
        assert_eq!(
            resolver
                .resolve_notification_address(BillerId::new(7))
                .await
                .unwrap()
                .as_deref(),
            Some("ana@example.com")
        );
        assert!(resolver
            .resolve_payment_method(BillerId::new(9))
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn parses_tables() {
        let resolver =
            StaticResolver::parse(" 7=pm_card_visa, 8 = pm_card_mastercard ,", "7=ana@example.com")
                .unwrap();
        assert_eq!(resolver.len(), 2);
        assert_eq!(
            resolver.payment_methods.get(&BillerId::new(8)).map(String::as_str),
            Some("pm_card_mastercard")
        );
        assert!(StaticResolver::parse("", "").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_entries() {
        for raw in ["7", "seven=pm", "7="] {
            assert_eq!(
                StaticResolver::parse(raw, "").unwrap_err(),
                StaticResolverError::InvalidEntry(raw.to_string())
            );
        }
    }
}
