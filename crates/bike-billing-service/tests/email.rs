//! Email endpoint integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn sends_email() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/email")
        .json(&json!({
            "recipient": "ana@example.com",
            "subject": "Welcome",
            "message": "Your account is ready."
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["sent"], true);
    assert_eq!(
        harness.notifier.sent(),
        vec![(
            "ana@example.com".to_string(),
            "Welcome".to_string(),
            "Your account is ready.".to_string()
        )]
    );
}

#[tokio::test]
async fn accepts_platform_field_names() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/email")
        .json(&json!({
            "destinatario": "ana@example.com",
            "assunto": "Oi",
            "mensagem": "Tudo certo."
        }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn invalid_address_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/email")
        .json(&json!({ "recipient": "not-an-address", "subject": "s", "message": "m" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "invalid_email");
    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn delivery_failure_is_bad_gateway() {
    let harness = TestHarness::new();
    harness.notifier.fail();

    let response = harness
        .server
        .post("/v1/email")
        .json(&json!({ "recipient": "ana@example.com", "subject": "s", "message": "m" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "external_service_error");
}
