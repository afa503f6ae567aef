//! Bike-billing HTTP client implementation.

use reqwest::{Client, StatusCode};
use std::time::Duration;

use bike_billing_core::{Amount, BillerId, Charge, ChargeId};

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, CardRequest, CardResponse, EmailRequest, EmailResponse, NewChargeRequest,
    ProcessQueueResponse, RestoreResponse,
};

/// Bike-billing API client.
#[derive(Debug, Clone)]
pub struct BillingClient {
    client: Client,
    base_url: String,
    admin_key: Option<String>,
}

impl BillingClient {
    /// Create a new bike-billing client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the service (e.g., `"http://bike-billing:8080"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new bike-billing client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_key: options.admin_key,
        })
    }

    /// Create a charge and settle it immediately.
    ///
    /// The returned charge is `PAID` or `FAILED`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    /// When the charge was created but could not be settled, the
    /// `ClientError::Api` carries its `charge_id`; it stays queued.
    pub async fn create_charge(
        &self,
        biller_id: BillerId,
        amount: Amount,
    ) -> Result<Charge, ClientError> {
        self.post_charge("/v1/charges", biller_id, amount).await
    }

    /// Put a charge in the queue for the next processing run.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn enqueue_charge(
        &self,
        biller_id: BillerId,
        amount: Amount,
    ) -> Result<Charge, ClientError> {
        self.post_charge("/v1/charges/queue", biller_id, amount)
            .await
    }

    /// Get a charge by ID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ChargeNotFound` if the charge does not exist.
    pub async fn get_charge(&self, charge_id: &ChargeId) -> Result<Charge, ClientError> {
        let url = format!("{}/v1/charges/{charge_id}", self.base_url);

        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Attempt every queued charge.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn process_queue(&self) -> Result<ProcessQueueResponse, ClientError> {
        let url = format!("{}/v1/charges/queue/process", self.base_url);

        let response = self.client.post(&url).send().await?;

        let report: ProcessQueueResponse = self.handle_response(response).await?;
        tracing::debug!(paid = report.paid_count, "Queue processed");
        Ok(report)
    }

    /// Validate card fields.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` with the failing field's code.
    pub async fn validate_card(&self, card: &CardRequest) -> Result<CardResponse, ClientError> {
        let url = format!("{}/v1/cards/validate", self.base_url);

        let response = self.client.post(&url).json(card).send().await?;

        self.handle_response(response).await
    }

    /// Send an email through the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn send_email(&self, email: &EmailRequest) -> Result<EmailResponse, ClientError> {
        let url = format!("{}/v1/email", self.base_url);

        let response = self.client.post(&url).json(email).send().await?;

        self.handle_response(response).await
    }

    /// Delete every charge. Requires an admin key.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if no admin key was set, or an
    /// error if the server rejects the request.
    pub async fn restore(&self) -> Result<RestoreResponse, ClientError> {
        let admin_key = self
            .admin_key
            .as_deref()
            .ok_or_else(|| ClientError::Configuration("admin key not set".into()))?;
        let url = format!("{}/v1/admin/restore", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-admin-key", admin_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn post_charge(
        &self,
        path: &str,
        biller_id: BillerId,
        amount: Amount,
    ) -> Result<Charge, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let request = NewChargeRequest { biller_id, amount };

        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code;
                let message = api_error.error.message;
                let charge_id = api_error.error.charge_id;

                // Map specific statuses to typed errors
                match status {
                    StatusCode::NOT_FOUND => Err(ClientError::ChargeNotFound { message }),
                    StatusCode::CONFLICT => Err(ClientError::ChargeAlreadySettled { message }),
                    StatusCode::UNPROCESSABLE_ENTITY => {
                        Err(ClientError::Validation { code, message })
                    }
                    _ => Err(ClientError::Api {
                        code,
                        message,
                        status: status.as_u16(),
                        charge_id,
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
                charge_id: None,
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 150).
    pub timeout_seconds: u64,
    /// Admin key for privileged endpoints.
    pub admin_key: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 150,
            admin_key: None,
        }
    }
}

impl ClientOptions {
    /// Create options with an admin key.
    #[must_use]
    pub fn with_admin_key(key: impl Into<String>) -> Self {
        Self {
            admin_key: Some(key.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn charge_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "biller_id": 7,
            "amount": 49.9,
            "status": status,
            "requested_at": "2025-03-01T10:00:00Z",
            "settled_at": if status == "PENDING" { serde_json::Value::Null } else { json!("2025-03-01T10:00:02Z") }
        })
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = BillingClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_options() {
        let client =
            BillingClient::with_options("http://localhost:8080", ClientOptions::with_admin_key("k"))
                .unwrap();
        assert_eq!(client.admin_key.as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn create_charge_posts_amount_as_number() {
        let server = MockServer::start().await;
        let id = ChargeId::generate().to_string();

        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .and(body_json(json!({ "biller_id": 7, "amount": 49.9 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(charge_json(&id, "PAID")))
            .expect(1)
            .mount(&server)
            .await;

        let client = BillingClient::new(server.uri()).unwrap();
        let charge = client
            .create_charge(BillerId::new(7), Amount::from_cents(4990).unwrap())
            .await
            .unwrap();

        assert_eq!(charge.id.to_string(), id);
        assert_eq!(charge.status, bike_billing_core::ChargeStatus::Paid);
        assert!(charge.settled_at.is_some());
    }

    #[tokio::test]
    async fn not_found_is_typed() {
        let server = MockServer::start().await;
        let id = ChargeId::generate();

        Mock::given(method("GET"))
            .and(path(format!("/v1/charges/{id}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": "not_found", "message": "charge not found" }
            })))
            .mount(&server)
            .await;

        let client = BillingClient::new(server.uri()).unwrap();
        let err = client.get_charge(&id).await.unwrap_err();

        assert!(matches!(err, ClientError::ChargeNotFound { .. }));
    }

    #[tokio::test]
    async fn validation_error_keeps_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/charges/queue"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "error": { "code": "invalid_amount", "message": "amount must be positive" }
            })))
            .mount(&server)
            .await;

        let client = BillingClient::new(server.uri()).unwrap();
        let err = client
            .enqueue_charge(BillerId::new(7), Amount::from_cents(1).unwrap())
            .await
            .unwrap_err();

        match err {
            ClientError::Validation { code, .. } => assert_eq!(code, "invalid_amount"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsettled_create_reports_queued_charge() {
        let server = MockServer::start().await;
        let id = ChargeId::generate().to_string();

        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({
                "error": {
                    "code": "external_service_error",
                    "message": "biller lookup unavailable: 503",
                    "charge_id": id
                }
            })))
            .mount(&server)
            .await;

        let client = BillingClient::new(server.uri()).unwrap();
        let err = client
            .create_charge(BillerId::new(7), Amount::from_cents(4990).unwrap())
            .await
            .unwrap_err();

        match err {
            ClientError::Api {
                status, charge_id, ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(charge_id.as_deref(), Some(id.as_str()));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn process_queue_parses_paid_charges() {
        let server = MockServer::start().await;
        let id = ChargeId::generate().to_string();

        Mock::given(method("POST"))
            .and(path("/v1/charges/queue/process"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "paid_count": 1,
                "paid": [charge_json(&id, "PAID")]
            })))
            .mount(&server)
            .await;

        let client = BillingClient::new(server.uri()).unwrap();
        let report = client.process_queue().await.unwrap();

        assert_eq!(report.paid_count, 1);
        assert_eq!(report.paid[0].id.to_string(), id);
    }

    #[tokio::test]
    async fn restore_sends_admin_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/admin/restore"))
            .and(header("x-admin-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "removed": 3 })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            BillingClient::with_options(server.uri(), ClientOptions::with_admin_key("secret"))
                .unwrap();
        assert_eq!(client.restore().await.unwrap().removed, 3);

        let no_key = BillingClient::new(server.uri()).unwrap();
        assert!(matches!(
            no_key.restore().await.unwrap_err(),
            ClientError::Configuration(_)
        ));
    }
}
