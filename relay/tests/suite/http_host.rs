use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use support_protocol::RelayReply;
use support_relay::Relay;
use support_relay::RelayConfig;
use support_relay::http::MAX_BODY_BYTES;
use support_relay::http::NETLIFY_RELAY_PATH;
use support_relay::http::RELAY_PATH;
use support_relay::http::router;
use tower::ServiceExt;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::any;

use super::API_TOKEN;
use super::USER_EMAIL;
use super::spawn_relay;
use super::ticket_url;
use super::vendor_config;

fn sample_body() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "deviceModel": "RAK4631 WisBlock Core",
        "issueDescription": "Device won't join network",
        "urgencyLevel": "high",
    })
}

/// A vendor that must never be contacted.
async fn silent_vendor() -> MockServer {
    let vendor = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&vendor)
        .await;
    vendor
}

fn assert_cors(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(headers["content-type"], "application/json");
}

#[tokio::test]
async fn missing_token_is_a_generic_server_error() {
    let vendor = silent_vendor().await;
    let config = RelayConfig::from_lookup(|name| match name {
        "ZENDESK_SUBDOMAIN" => Some("rakwireless".to_string()),
        "ZENDESK_USER_EMAIL" => Some(USER_EMAIL.to_string()),
        "ZENDESK_TECH_SUPPORT_ASSIGNEE_ID" => Some("360001234567".to_string()),
        "ZENDESK_API_BASE_URL" => Some(vendor.uri()),
        _ => None,
    });
    assert!(config.is_err());
    let addr = spawn_relay(Relay::new(config)).await;

    let response = reqwest::Client::new()
        .post(ticket_url(addr))
        .json(&sample_body())
        .send()
        .await
        .expect("relay reachable");

    assert_eq!(response.status().as_u16(), 500);
    assert_cors(&response);
    let body = response.text().await.expect("body");
    for secret in ["ZENDESK", USER_EMAIL, "rakwireless", API_TOKEN, "panicked"] {
        assert!(!body.contains(secret), "response leaks {secret}: {body}");
    }
    let reply: RelayReply = serde_json::from_str(&body).expect("json reply");
    assert_eq!(reply, RelayReply::failure("Internal server configuration error."));
}

#[tokio::test]
async fn preflight_is_always_ok_and_empty() {
    let vendor = silent_vendor().await;
    let addr = spawn_relay(Relay::new(Ok(vendor_config(&vendor)))).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, ticket_url(addr))
        .header("Origin", "https://support.example.com")
        .header("Access-Control-Request-Method", "DELETE")
        .header("X-Unexpected", "1")
        .body("not json at all")
        .send()
        .await
        .expect("relay reachable");

    assert_eq!(response.status().as_u16(), 200);
    assert_cors(&response);
    assert_eq!(response.text().await.expect("body"), "");
}

#[tokio::test]
async fn other_methods_get_405_with_allow() {
    let vendor = silent_vendor().await;
    let addr = spawn_relay(Relay::new(Ok(vendor_config(&vendor)))).await;
    let client = reqwest::Client::new();

    for method in [reqwest::Method::GET, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let response = client
            .request(method.clone(), ticket_url(addr))
            .send()
            .await
            .expect("relay reachable");
        assert_eq!(response.status().as_u16(), 405, "{method}");
        assert_eq!(response.headers()["allow"], "POST, OPTIONS");
        assert_cors(&response);
        let reply: RelayReply = response.json().await.expect("json reply");
        assert_eq!(reply, RelayReply::failure("Method Not Allowed."));
    }
}

#[tokio::test]
async fn bad_bodies_are_rejected_before_the_vendor() {
    let vendor = silent_vendor().await;
    let addr = spawn_relay(Relay::new(Ok(vendor_config(&vendor)))).await;
    let client = reqwest::Client::new();

    let cases: [(Vec<u8>, &str); 4] = [
        (Vec::new(), "Invalid request body."),
        (b"{\"name\":".to_vec(), "Invalid request body."),
        (vec![0xff, 0xfe, 0x00], "Invalid request body."),
        (
            json!({ "name": "Jane Doe", "email": "jane@example.com" })
                .to_string()
                .into_bytes(),
            "Missing required fields: name, email, and issueDescription.",
        ),
    ];

    for (body, message) in cases {
        let response = client
            .post(ticket_url(addr))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("relay reachable");
        assert_eq!(response.status().as_u16(), 400);
        let reply: RelayReply = response.json().await.expect("json reply");
        assert_eq!(reply, RelayReply::failure(message));
    }
}

#[tokio::test]
async fn oversized_body_gets_a_json_413_with_cors() {
    let vendor = silent_vendor().await;
    let app = router(Arc::new(Relay::new(Ok(vendor_config(&vendor)))));

    let mut body = sample_body();
    body["issueDescription"] = json!("x".repeat(MAX_BODY_BYTES));
    let request = Request::builder()
        .method("POST")
        .uri(NETLIFY_RELAY_PATH)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");

    let response = app.oneshot(request).await.expect("router answers");
    assert_eq!(response.status().as_u16(), 413);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["content-type"], "application/json");

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let reply: RelayReply = serde_json::from_slice(&bytes).expect("json reply");
    assert_eq!(reply, RelayReply::failure("Request body too large."));
}

#[tokio::test]
async fn both_paths_are_served() {
    let vendor = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ticket": { "id": 9 } })))
        .expect(2)
        .mount(&vendor)
        .await;
    let addr = spawn_relay(Relay::new(Ok(vendor_config(&vendor)))).await;
    let client = reqwest::Client::new();

    for url in [ticket_url(addr), format!("http://{addr}{RELAY_PATH}")] {
        let response = client
            .post(&url)
            .json(&sample_body())
            .send()
            .await
            .expect("relay reachable");
        assert_eq!(response.status().as_u16(), 201, "{url}");
        let reply: Value = response.json().await.expect("json reply");
        assert_eq!(
            reply,
            json!({
                "success": true,
                "message": "Support request submitted successfully!",
                "ticketId": 9,
            })
        );
    }

    let health = client
        .get(format!("http://{addr}/healthz"))
        .send()
        .await
        .expect("relay reachable");
    assert_eq!(health.status().as_u16(), 200);
    assert_eq!(health.text().await.expect("body"), "ok");
}
