//! Application state.

use std::sync::Arc;

use bike_billing_store::Store;

use crate::billing::{BillingOrchestrator, ChargeGateway, Notifier, PaymentMethodResolver};
use crate::config::ServiceConfig;
use crate::rental::{RentalClient, StaticResolver};
use crate::sendgrid::{LogNotifier, SendGridClient};
use crate::stripe::{StripeClient, UnconfiguredGateway};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The billing orchestrator.
    pub billing: Arc<BillingOrchestrator>,

    /// Notifier, also used directly by the email endpoint.
    pub notifier: Arc<dyn Notifier>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create application state, building collaborators from configuration.
    ///
    /// Unconfigured integrations fall back to stand-ins that log a warning at
    /// startup: payments always fail and emails are only logged.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let gateway = build_gateway(&config);
        let resolver = build_resolver(&config);
        let notifier = build_notifier(&config);
        Self::with_collaborators(store, config, gateway, resolver, notifier)
    }

    /// Create application state with explicit collaborators.
    #[must_use]
    pub fn with_collaborators(
        store: Arc<dyn Store>,
        config: ServiceConfig,
        gateway: Arc<dyn ChargeGateway>,
        resolver: Arc<dyn PaymentMethodResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let billing = Arc::new(BillingOrchestrator::new(
            store,
            gateway,
            resolver,
            Arc::clone(&notifier),
        ));

        Self {
            billing,
            notifier,
            config,
        }
    }
}

fn build_gateway(config: &ServiceConfig) -> Arc<dyn ChargeGateway> {
    let client = config.stripe_api_key.as_ref().and_then(|key| {
        match StripeClient::new(key, &config.stripe_api_url, &config.stripe_currency) {
            Ok(client) => {
                tracing::info!(currency = %client.currency(), "Stripe integration enabled");
                Some(client)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Stripe client");
                None
            }
        }
    });

    match client {
        Some(client) => Arc::new(client),
        None => {
            tracing::warn!("Stripe not configured - every charge attempt will fail");
            Arc::new(UnconfiguredGateway)
        }
    }
}

fn build_notifier(config: &ServiceConfig) -> Arc<dyn Notifier> {
    let client = config
        .sendgrid_api_key
        .as_ref()
        .zip(config.email_sender.as_ref())
        .and_then(|(key, sender)| {
            match SendGridClient::new(key, &config.sendgrid_api_url, sender) {
                Ok(client) => {
                    tracing::info!(sender = %sender, "SendGrid integration enabled");
                    Some(client)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SendGrid client");
                    None
                }
            }
        });

    match client {
        Some(client) => Arc::new(client),
        None => {
            tracing::warn!("SendGrid not configured - emails will only be logged");
            Arc::new(LogNotifier)
        }
    }
}

fn build_resolver(config: &ServiceConfig) -> Arc<dyn PaymentMethodResolver> {
    if let Some(url) = &config.rental_service_url {
        match RentalClient::new(url, &config.rental_payment_method) {
            Ok(client) => {
                tracing::info!(rental_url = %url, "Rental platform lookups enabled");
                return Arc::new(client);
            }
            Err(e) => tracing::error!(error = %e, "Failed to create rental client"),
        }
    }

    match StaticResolver::parse(&config.biller_payment_methods, &config.biller_emails) {
        Ok(resolver) => {
            tracing::info!(billers = resolver.len(), "Using static biller table");
            Arc::new(resolver)
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid static biller table - no biller can be charged");
            Arc::new(StaticResolver::new())
        }
    }
}
