//! Fixtures shared by the integration suites: a complete sample request
//! and helpers for standing up a fake relay with wiremock.

use std::sync::Arc;

use serde_json::Value;
use serde_json::json;
use support_core::FlowOptions;
use support_core::RelayGateway;
use support_core::SupportSession;
use support_protocol::RecordPatch;
use support_protocol::SupportPayload;
use support_protocol::SupportRecord;
use support_protocol::UrgencyLevel;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

pub const RELAY_PATH: &str = "/.netlify/functions/support-ticket";

/// Jane's gateway problem: every required field filled in.
pub fn sample_patch() -> RecordPatch {
    RecordPatch {
        name: Some("Jane Doe".to_string()),
        email: Some("jane@example.com".to_string()),
        device_model: Some("RAK4631 WisBlock Core".to_string()),
        issue_description: Some("Device won't join network".to_string()),
        urgency_level: Some(UrgencyLevel::High),
        ..Default::default()
    }
}

pub fn sample_record() -> SupportRecord {
    let mut record = SupportRecord::default();
    record.apply(sample_patch());
    record
}

pub fn sample_payload() -> SupportPayload {
    SupportPayload::from(&sample_record())
}

pub fn relay_url(server: &MockServer) -> String {
    format!("{}{RELAY_PATH}", server.uri())
}

/// Mount a single expected POST on the relay path answering `status` with
/// a JSON `body`.
pub async fn mount_relay_reply(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path(RELAY_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

pub fn created_body(ticket_id: Value) -> Value {
    json!({
        "success": true,
        "message": "Support request submitted successfully!",
        "ticketId": ticket_id,
    })
}

pub fn failure_body(message: &str) -> Value {
    json!({ "success": false, "message": message })
}

/// A session on the review step with [`sample_patch`] applied, submitting
/// through a real HTTP gateway pointed at `relay_url`.
///
/// Panics if the gateway cannot be built or the sample record does not
/// validate; both are test setup failures.
pub async fn session_at_review(relay_url: &str) -> SupportSession {
    let gateway = match RelayGateway::new(relay_url, std::time::Duration::from_secs(5)) {
        Ok(gateway) => gateway,
        Err(err) => panic!("gateway: {err}"),
    };
    let session = SupportSession::new(FlowOptions::default(), Arc::new(gateway));
    session.update(sample_patch()).await;
    for _ in 0..3 {
        if let Err(err) = session.advance().await {
            panic!("advance: {err}");
        }
    }
    session
}
