//! Form session -> real gateway -> relay router -> fake vendor.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pretty_assertions::assert_eq;
use serde_json::json;
use support_core::ErrorKind;
use support_core::Step;
use support_core::SubmitError;
use support_core::classify::RATE_LIMIT_MESSAGE;
use support_protocol::TicketId;
use support_relay::Relay;
use support_test_support::session_at_review;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::API_TOKEN;
use super::GROUP_ID;
use super::USER_EMAIL;
use super::spawn_relay;
use super::ticket_url;
use super::vendor_config;

const TICKETS_PATH: &str = "/api/v2/tickets.json";

fn expected_authorization() -> String {
    format!("Basic {}", STANDARD.encode(format!("{USER_EMAIL}/token:{API_TOKEN}")))
}

#[tokio::test]
async fn submitted_request_becomes_a_ticket() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .and(header("authorization", expected_authorization().as_str()))
        .and(body_partial_json(json!({
            "ticket": {
                "subject": "Support Request: RAK4631 WisBlock Core from Jane Doe",
                "priority": "urgent",
                "group_id": GROUP_ID,
                "requester": { "name": "Jane Doe", "email": "jane@example.com", "verified": true },
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ticket": { "id": 12345 } })))
        .expect(1)
        .mount(&vendor)
        .await;

    let addr = spawn_relay(Relay::new(Ok(vendor_config(&vendor)))).await;
    let session = session_at_review(&ticket_url(addr)).await;

    let receipt = session.submit().await.expect("ticket should be created");
    assert_eq!(receipt.ticket_id, Some(TicketId::Number(12345)));
    assert_eq!(receipt.message, "Support request submitted successfully!");
    assert_eq!(session.current_step().await, Step::Confirmation);
    assert_eq!(
        session.record().await.submitted_ticket_id,
        Some(TicketId::Number(12345))
    );
}

#[tokio::test]
async fn vendor_rate_limit_leaves_the_form_on_review() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({ "error": "TooManyRequests" })))
        .expect(1)
        .mount(&vendor)
        .await;

    let addr = spawn_relay(Relay::new(Ok(vendor_config(&vendor)))).await;
    let session = session_at_review(&ticket_url(addr)).await;
    let before = session.record().await;

    let err = session.submit().await.expect_err("rate limit must fail");
    match err {
        SubmitError::Rejected(classified) => {
            assert_eq!(classified.kind, ErrorKind::RateLimited);
            assert_eq!(classified.status, Some(429));
            assert_eq!(classified.message, RATE_LIMIT_MESSAGE);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.current_step().await, Step::Review);
    assert_eq!(session.record().await, before);
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn vendor_timeout_reaches_the_client_as_timeout() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "ticket": { "id": 1 } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&vendor)
        .await;

    let mut config = vendor_config(&vendor);
    config.vendor_timeout = Duration::from_millis(200);
    let addr = spawn_relay(Relay::new(Ok(config))).await;
    let session = session_at_review(&ticket_url(addr)).await;

    let err = session.submit().await.expect_err("vendor timeout must fail");
    match err {
        SubmitError::Rejected(classified) => {
            assert_eq!(classified.kind, ErrorKind::Timeout);
            assert_eq!(classified.status, Some(504));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.current_step().await, Step::Review);
}

#[tokio::test]
async fn vendor_validation_description_reaches_the_client() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": "RecordInvalid",
            "description": "Record validation errors",
        })))
        .expect(1)
        .mount(&vendor)
        .await;

    let addr = spawn_relay(Relay::new(Ok(vendor_config(&vendor)))).await;
    let session = session_at_review(&ticket_url(addr)).await;

    let err = session.submit().await.expect_err("validation must fail");
    match err {
        SubmitError::Rejected(classified) => {
            assert_eq!(classified.kind, ErrorKind::Validation);
            assert_eq!(
                classified.message,
                "Invalid data sent to Zendesk: Record validation errors"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
