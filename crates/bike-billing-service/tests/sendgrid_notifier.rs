//! SendGrid notifier tests against a mock SendGrid API.

use bike_billing_service::{NotificationError, Notifier, SendGridClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SendGridClient {
    SendGridClient::new("SG.test", server.uri(), "billing@example.com").unwrap()
}

#[tokio::test]
async fn sends_plain_text_mail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(header("authorization", "Bearer SG.test"))
        .and(body_partial_json(json!({
            "personalizations": [{ "to": [{ "email": "ana@example.com" }] }],
            "from": { "email": "billing@example.com" },
            "subject": "Payment confirmed",
            "content": [{ "type": "text/plain", "value": "Paid." }]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send("ana@example.com", "Payment confirmed", "Paid.")
        .await
        .unwrap();
}

#[tokio::test]
async fn provider_rejection_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad sender"))
        .mount(&server)
        .await;

    let err = client(&server)
        .send("ana@example.com", "s", "b")
        .await
        .unwrap_err();

    match err {
        NotificationError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad sender");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_provider_is_transport_error() {
    let client = SendGridClient::new("SG.test", "http://127.0.0.1:1", "billing@example.com").unwrap();

    let err = client.send("ana@example.com", "s", "b").await.unwrap_err();

    assert!(matches!(err, NotificationError::Transport(_)));
}
