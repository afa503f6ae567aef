//! Common test utilities for bike-billing integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;

use bike_billing_core::BillerId;
use bike_billing_service::{
    create_router, AppState, ChargeGateway, GatewayCharge, GatewayError, NotificationError,
    Notifier, PaymentMethodResolver, ResolverError, ServiceConfig, StaticResolver,
};
use bike_billing_store::MemoryStore;

/// Admin key configured in the harness.
pub const ADMIN_KEY: &str = "test-admin-key";

/// Biller with a payment method and an email address.
pub const PAYING_BILLER: i64 = 7;

/// Biller with a payment method but no email address.
pub const SILENT_BILLER: i64 = 8;

/// Biller with no payment method.
pub const UNKNOWN_BILLER: i64 = 9;

/// Gateway that replays scripted answers and succeeds once they run out.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<GatewayCharge, GatewayError>>>,
    calls: Mutex<Vec<(i64, String)>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedGateway {
    /// Queue the next answer.
    pub fn push(&self, answer: Result<GatewayCharge, GatewayError>) {
        self.script.lock().unwrap().push_back(answer);
    }

    /// Queue a card decline.
    pub fn decline_next(&self) {
        self.push(Err(GatewayError::CardDeclined {
            message: "Your card was declined.".into(),
            code: Some("card_declined".into()),
        }));
    }

    /// Make every following charge take `delay`.
    pub fn slow_down(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Every `(amount_cents, payment_method)` charged so far.
    pub fn calls(&self) -> Vec<(i64, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChargeGateway for ScriptedGateway {
    async fn charge(
        &self,
        amount_cents: i64,
        payment_method: &str,
    ) -> Result<GatewayCharge, GatewayError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((amount_cents, payment_method.to_string()));
            calls.len()
        };
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(GatewayCharge {
                id: format!("pi_test_{n}"),
                status: "succeeded".into(),
            })
        })
    }
}

/// Notifier that records every message and can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    /// Every `(address, subject, body)` sent so far.
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Make every following send fail.
    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        if *self.failing.lock().unwrap() {
            return Err(NotificationError::Transport("connection refused".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((address.into(), subject.into(), body.into()));
        Ok(())
    }
}

/// Static biller table that can be taken offline.
pub struct SwitchableResolver {
    inner: StaticResolver,
    down: AtomicBool,
}

impl SwitchableResolver {
    /// Make every following payment-method lookup fail.
    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    /// Answer lookups again.
    pub fn recover(&self) {
        self.down.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentMethodResolver for SwitchableResolver {
    async fn resolve_payment_method(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(ResolverError::Unavailable("503".into()));
        }
        self.inner.resolve_payment_method(biller_id).await
    }

    async fn resolve_notification_address(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError> {
        self.inner.resolve_notification_address(biller_id).await
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The gateway behind the orchestrator.
    pub gateway: Arc<ScriptedGateway>,
    /// The notifier behind the orchestrator and the email endpoint.
    pub notifier: Arc<RecordingNotifier>,
    /// The biller lookups behind the orchestrator.
    pub resolver: Arc<SwitchableResolver>,
}

impl TestHarness {
    /// Create a new test harness with an empty store.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig {
            admin_api_key: Some(ADMIN_KEY.into()),
            ..ServiceConfig::default()
        })
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let gateway = Arc::new(ScriptedGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let resolver = Arc::new(SwitchableResolver {
            inner: StaticResolver::new()
                .with_payment_method(BillerId::new(PAYING_BILLER), "pm_card_visa")
                .with_address(BillerId::new(PAYING_BILLER), "ana@example.com")
                .with_payment_method(BillerId::new(SILENT_BILLER), "pm_card_mastercard"),
            down: AtomicBool::new(false),
        });

        let state = AppState::with_collaborators(
            Arc::new(MemoryStore::new()),
            config,
            gateway.clone(),
            resolver.clone(),
            notifier.clone(),
        );
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            gateway,
            notifier,
            resolver,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
