use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use support_core::translate;
use support_protocol::TicketId;
use support_relay::TicketVendor;
use support_relay::VendorError;
use support_relay::ZendeskClient;
use support_test_support::sample_payload;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::basic_auth;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::API_TOKEN;
use super::GROUP_ID;
use super::USER_EMAIL;
use super::vendor_config;

async fn vendor_replying(template: ResponseTemplate) -> MockServer {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/tickets.json"))
        .respond_with(template)
        .expect(1)
        .mount(&vendor)
        .await;
    vendor
}

#[tokio::test]
async fn posts_the_envelope_with_token_auth() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/tickets.json"))
        .and(basic_auth(format!("{USER_EMAIL}/token"), API_TOKEN))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ticket": { "id": 777 } })))
        .expect(1)
        .mount(&vendor)
        .await;

    let envelope = translate(&sample_payload()).with_group(GROUP_ID);
    let ticket_id = ZendeskClient::new()
        .create_ticket(&vendor_config(&vendor), &envelope)
        .await
        .expect("ticket created");
    assert_eq!(ticket_id, Some(TicketId::Number(777)));

    let requests = vendor.received_requests().await.expect("recording enabled");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body, serde_json::to_value(&envelope).expect("envelope json"));
}

#[tokio::test]
async fn success_without_an_id_is_still_success() {
    let vendor = vendor_replying(ResponseTemplate::new(200).set_body_string("")).await;
    let envelope = translate(&sample_payload());

    let ticket_id = ZendeskClient::new()
        .create_ticket(&vendor_config(&vendor), &envelope)
        .await
        .expect("2xx is success");
    assert_eq!(ticket_id, None);
}

#[tokio::test]
async fn failure_keeps_status_and_description() {
    let vendor = vendor_replying(ResponseTemplate::new(422).set_body_json(json!({
        "error": "RecordInvalid",
        "description": "Record validation errors",
        "details": { "requester": [{ "description": "Requester: Email is invalid" }] },
    })))
    .await;

    let err = ZendeskClient::new()
        .create_ticket(&vendor_config(&vendor), &translate(&sample_payload()))
        .await
        .expect_err("422 must fail");
    match err {
        VendorError::Status {
            status,
            description,
        } => {
            assert_eq!(status, 422);
            assert_eq!(description.as_deref(), Some("Record validation errors"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn html_error_page_has_no_description() {
    let vendor = vendor_replying(
        ResponseTemplate::new(503).set_body_string("<html>Service Unavailable</html>"),
    )
    .await;

    let err = ZendeskClient::new()
        .create_ticket(&vendor_config(&vendor), &translate(&sample_payload()))
        .await
        .expect_err("503 must fail");
    assert!(matches!(
        err,
        VendorError::Status {
            status: 503,
            description: None
        }
    ));
}

#[tokio::test]
async fn slow_vendor_times_out() {
    let vendor = vendor_replying(
        ResponseTemplate::new(201)
            .set_body_json(json!({ "ticket": { "id": 1 } }))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let mut config = vendor_config(&vendor);
    config.vendor_timeout = Duration::from_millis(200);

    let err = ZendeskClient::new()
        .create_ticket(&config, &translate(&sample_payload()))
        .await
        .expect_err("request should time out");
    assert!(matches!(err, VendorError::Timeout));
}

#[tokio::test]
async fn unreachable_vendor_is_a_transport_error() {
    let vendor = MockServer::start().await;
    let mut config = vendor_config(&vendor);
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    config.api_base_url = format!("http://127.0.0.1:{port}");

    let err = ZendeskClient::new()
        .create_ticket(&config, &translate(&sample_payload()))
        .await
        .expect_err("nothing is listening");
    assert!(matches!(err, VendorError::Transport(_)));
}
